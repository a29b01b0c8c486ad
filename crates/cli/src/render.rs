use owo_colors::OwoColorize;
use socratic_agent::{Explanation, SessionState};
use socratic_core::{Error, LESSONS, Speaker, Transcript, Turn};
use socratic_store::SavedChat;

pub fn format_turn(turn: &Turn) -> String {
    match turn.speaker() {
        Speaker::Assistant => format!("{} {}", "Assistant:".cyan().bold(), turn.text()),
        Speaker::User => format!("{} {}", "You:".green().bold(), turn.text()),
    }
}

pub fn print_transcript(topic: Option<&str>, transcript: &Transcript) {
    match topic {
        Some(topic) => println!("{}", format!("Topic: {}", topic).bold().underline()),
        None => {
            println!("{}", "No active chat. Start one with /start <topic>.".dimmed());
            return;
        }
    }
    for turn in transcript {
        println!("{}", format_turn(turn));
    }
    if transcript.awaiting_reply() {
        println!("{}", "(no reply yet; /retry to send again)".yellow());
    }
}

pub fn format_saved(entry: &SavedChat, open: bool) -> String {
    let saved_at = format!("saved {}", entry.saved_at.format("%H:%M:%S UTC"));
    let mut line = format!("  - {} {}", entry.topic.cyan(), saved_at.dimmed());
    if open {
        line.push_str(&format!(" {}", "(open)".dimmed()));
    }
    line
}

pub fn print_saved(entries: &[SavedChat], state: &SessionState) {
    if entries.is_empty() {
        println!("{}", "No saved chats.".dimmed());
        return;
    }
    println!("{}", "Saved chats".bold().underline());
    for entry in entries {
        println!("{}", format_saved(entry, state.current_topic() == Some(entry.topic.as_str())));
    }
}

pub fn print_lessons() {
    println!("{}", "Learning resources".bold().underline());
    for (index, lesson) in LESSONS.iter().enumerate() {
        println!("  {}. {:<12} {}", index + 1, lesson.topic.cyan(), lesson.video_url.dimmed());
    }
}

pub fn print_explanation(explanation: &Explanation) {
    let lesson = &explanation.lesson;
    println!("{}", lesson.topic.bold().underline());
    println!("{} {}", "Video:".blue().bold(), lesson.video_url);
    println!("{} {}", "Image:".blue().bold(), explanation.image_path.display());
    println!("{} {}", "Assistant:".cyan().bold(), explanation.text);
}

pub fn print_info(message: &str) {
    println!("{} {}", "Info:".blue().bold(), message);
}

pub fn print_success(message: &str) {
    println!("{} {}", "Success:".green().bold(), message);
}

pub fn print_error(error: &Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);
}

pub fn print_busy() {
    println!("{}", "Thinking...".dimmed());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_turn_labels_speaker() {
        assert!(format_turn(&Turn::assistant("Hi")).contains("Assistant:"));
        assert!(format_turn(&Turn::user("hello")).contains("You:"));
        assert!(format_turn(&Turn::user("hello")).ends_with("hello"));
    }

    #[test]
    fn test_format_saved_shows_save_time() {
        let mut store = socratic_store::TranscriptStore::new();
        store.save("Heaps", vec![Turn::assistant("Hi")].into());
        let entry = &store.entries()[0];

        let line = format_saved(entry, false);
        assert!(line.contains("Heaps"));
        assert!(line.contains(&entry.saved_at.format("%H:%M:%S UTC").to_string()));
        assert!(!line.contains("(open)"));
        assert!(format_saved(entry, true).contains("(open)"));
    }
}
