#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    CharacterId, // "Name:"
    DialogueLine,
    Command, // "@name param"
    Choice,  // tab or deep indent
    Tag,     // "[tag]"
}

/// One non-blank source line after classification.
///
/// `kind` is decided on the raw line, `text` is the line with its leading
/// indentation removed. Inside a choice block the compiler classifies `text`
/// again, which is how an indented `[tag]` is read as a tag.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub kind: LineKind,
    pub text: String,
    pub line_no: usize,
}
