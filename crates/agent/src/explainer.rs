use socratic_core::{Lesson, Result};
use socratic_providers::{Media, ModelGateway};
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Model explanation of one lesson's visualization
#[derive(Debug, Clone, PartialEq)]
pub struct Explanation {
    pub lesson: Lesson,
    pub image_path: PathBuf,
    pub text: String,
}

/// Learn page backend: pairs a lesson image with its prompt and asks the model
pub struct LessonExplainer<'a> {
    gateway: &'a ModelGateway,
    assets_dir: &'a Path,
}

impl<'a> LessonExplainer<'a> {
    pub fn new(gateway: &'a ModelGateway, assets_dir: &'a Path) -> Self {
        Self { gateway, assets_dir }
    }

    pub fn image_path(&self, lesson: &Lesson) -> PathBuf {
        self.assets_dir.join(lesson.image_file)
    }

    /// Fails with `AssetNotFound` before any model call when the image is missing
    #[instrument(skip(self, lesson), fields(topic = lesson.topic))]
    pub async fn explain(&self, lesson: &Lesson) -> Result<Explanation> {
        let image_path = self.image_path(lesson);
        let image = Media::from_path(&image_path)?;
        tracing::debug!(path = %image_path.display(), bytes = image.data.len(), "Loaded lesson image");

        let text = self.gateway.generate(lesson.prompt, vec![image]).await?;
        Ok(Explanation { lesson: *lesson, image_path, text })
    }
}
