/// Characters that end a clause. Each one is kept with the clause before it.
pub const CLAUSE_TERMINATORS: [char; 6] = ['.', ';', ':', '!', '?', '…'];

/// A punctuation-delimited piece of a paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Clause text, trimmed. May be empty when punctuation repeats ("!!").
    pub text: String,
    /// Terminator that closed the clause; `None` for a trailing fragment.
    pub punctuation: Option<char>,
}

impl Segment {
    /// Whether there is anything to send to the service.
    pub fn is_spoken(&self) -> bool {
        !self.text.is_empty()
    }

    /// Clause text with its terminator re-attached, since the terminator
    /// shapes the intonation the service produces.
    pub fn spoken_text(&self) -> String {
        match self.punctuation {
            Some(p) => format!("{}{}", self.text, p),
            None => self.text.clone(),
        }
    }
}

/// Splits a paragraph after every clause terminator.
///
/// Empty clauses that carry punctuation are kept (they still earn a pause);
/// an empty trailing fragment without punctuation is dropped.
pub fn split_clauses(paragraph: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut current = String::new();

    for ch in paragraph.chars() {
        if CLAUSE_TERMINATORS.contains(&ch) {
            segments.push(Segment {
                text: current.trim().to_string(),
                punctuation: Some(ch),
            });
            current.clear();
        } else {
            current.push(ch);
        }
    }

    let tail = current.trim();
    if !tail.is_empty() {
        segments.push(Segment {
            text: tail.to_string(),
            punctuation: None,
        });
    }
    segments
}
