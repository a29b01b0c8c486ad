//! Static catalog for the learn page.
//!
//! Each lesson pairs a sorting algorithm with a recorded walkthrough video, a
//! local visualization image (resolved against the configured assets
//! directory) and the prompt used to ask the model for an explanation.

/// One entry of the learn page catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lesson {
    pub topic: &'static str,
    pub video_url: &'static str,
    pub image_file: &'static str,
    pub prompt: &'static str,
}

pub const LESSONS: [Lesson; 4] = [
    Lesson {
        topic: "Bubble Sort",
        video_url: "https://www.youtube.com/watch?v=xli_FI7CuzA",
        image_file: "bs.jpg",
        prompt: "Explain bubble sort visualizations with image",
    },
    Lesson {
        topic: "Merge Sort",
        video_url: "https://www.youtube.com/watch?v=4VqmGXwpLqc",
        image_file: "ms.png",
        prompt: "Explain merge sort visualizations with images",
    },
    Lesson {
        topic: "Quick Sort",
        video_url: "https://www.youtube.com/watch?v=Hoixgm4-P4M",
        image_file: "qs.png",
        prompt: "Explain quick sort visualizations with images",
    },
    Lesson {
        topic: "Heap Sort",
        video_url: "https://www.youtube.com/watch?v=2DmK_H7IdTo",
        image_file: "hs.png",
        prompt: "Explain heap sort visualizations with images",
    },
];

/// Find a lesson by topic name (case-insensitive, spaces optional) or by 1-based index
pub fn find_lesson(query: &str) -> Option<&'static Lesson> {
    let query = query.trim();
    if let Ok(index) = query.parse::<usize>() {
        return index.checked_sub(1).and_then(|i| LESSONS.get(i));
    }

    let wanted = normalize(query);
    LESSONS.iter().find(|lesson| normalize(lesson.topic) == wanted)
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_four_sorting_topics() {
        let topics: Vec<&str> = LESSONS.iter().map(|l| l.topic).collect();
        assert_eq!(topics, vec!["Bubble Sort", "Merge Sort", "Quick Sort", "Heap Sort"]);
    }

    #[test]
    fn test_find_lesson_by_name() {
        assert_eq!(find_lesson("Bubble Sort").unwrap().image_file, "bs.jpg");
        assert_eq!(find_lesson("merge sort").unwrap().image_file, "ms.png");
        assert_eq!(find_lesson("quicksort").unwrap().image_file, "qs.png");
        assert_eq!(find_lesson("heap-sort").unwrap().image_file, "hs.png");
    }

    #[test]
    fn test_find_lesson_by_index() {
        assert_eq!(find_lesson("1").unwrap().topic, "Bubble Sort");
        assert_eq!(find_lesson("4").unwrap().topic, "Heap Sort");
        assert!(find_lesson("0").is_none());
        assert!(find_lesson("5").is_none());
    }

    #[test]
    fn test_find_lesson_unknown() {
        assert!(find_lesson("Radix Sort").is_none());
        assert!(find_lesson("").is_none());
    }
}
