use crate::ast::{Line, LineKind};
use crate::builder::{GraphAssembler, NodeBuilder};
use crate::error::{Error, Result};
use crate::parser;
use crate::types::DialogueGraph;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    pub max_nodes: usize,
    pub max_commands: usize,
    pub max_choices: usize,
    pub indent_threshold: usize,
    pub default_tag_prefix: String,
    /// Close the node or choice block still open when input ends. With
    /// `false`, whatever is open at the end is dropped.
    pub flush_at_end: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            max_nodes: 512,
            max_commands: 3,
            max_choices: 4,
            indent_threshold: parser::DEFAULT_INDENT_THRESHOLD,
            default_tag_prefix: "node_".to_string(),
            flush_at_end: true,
        }
    }
}

impl CompileOptions {
    pub fn from_json(text: &str) -> Result<Self> {
        let options: CompileOptions = serde_json::from_str(text)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if self.indent_threshold == 0 {
            return Err(Error::InvalidOptions(
                "indent_threshold must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Dialogue,
    Choice,
}

enum Step {
    Consumed,
    /// Dispatch the same line again under the given state.
    Reprocess(State),
}

#[derive(Debug, Clone, Default)]
pub struct Compiler {
    options: CompileOptions,
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: CompileOptions) -> Self {
        Self { options }
    }

    pub fn compile(&self, text: &str) -> DialogueGraph {
        self.compile_lines(&parser::parse(text, self.options.indent_threshold))
    }

    /// Every call runs in a fresh session, so a compiler can be reused.
    pub fn compile_lines(&self, lines: &[Line]) -> DialogueGraph {
        let mut session = Session::new(&self.options);
        for line in lines {
            session.feed(line);
        }
        session.finish()
    }
}

struct Session<'a> {
    options: &'a CompileOptions,
    state: State,
    builder: NodeBuilder,
    graph: GraphAssembler,
}

impl<'a> Session<'a> {
    fn new(options: &'a CompileOptions) -> Self {
        Self {
            options,
            state: State::Idle,
            builder: NodeBuilder::new(options),
            graph: GraphAssembler::new(options.max_nodes),
        }
    }

    fn feed(&mut self, line: &Line) {
        loop {
            tracing::trace!(line_no = line.line_no, state = ?self.state, kind = ?line.kind, "dispatch");
            let step = match self.state {
                State::Idle => self.handle_idle(line),
                State::Dialogue => self.handle_dialogue(line),
                State::Choice => self.handle_choice(line),
            };
            match step {
                Step::Consumed => break,
                Step::Reprocess(next) => self.state = next,
            }
        }
    }

    fn handle_idle(&mut self, line: &Line) -> Step {
        match line.kind {
            LineKind::CharacterId => {
                if let Some(id) = parser::parse_character_id(&line.text) {
                    self.builder.set_character(id);
                }
                self.state = State::Dialogue;
            }
            LineKind::DialogueLine => self.builder.push_text(&line.text),
            LineKind::Command => {
                if let Some(command) = parser::parse_command(&line.text) {
                    let name = command.name.clone();
                    if !self.builder.push_command(command) {
                        tracing::debug!(line_no = line.line_no, %name, "command dropped, node is full");
                    }
                }
            }
            LineKind::Tag => {
                match parser::parse_tag(&line.text) {
                    Some(tag) => self.builder.set_tag(tag),
                    None => {
                        tracing::debug!(line_no = line.line_no, text = %line.text, "malformed tag ignored")
                    }
                }
            }
            LineKind::Choice => return Step::Reprocess(State::Choice),
        }
        Step::Consumed
    }

    fn handle_dialogue(&mut self, line: &Line) -> Step {
        if line.kind == LineKind::DialogueLine {
            self.builder.push_text(&line.text);
            return Step::Consumed;
        }
        self.close_node();
        Step::Reprocess(State::Idle)
    }

    fn handle_choice(&mut self, line: &Line) -> Step {
        if line.kind != LineKind::Choice {
            self.finish_choice_block();
            return Step::Reprocess(State::Idle);
        }

        // Indentation is already gone, so a nested "[tag]" reads as a tag here.
        match parser::classify(&line.text, self.options.indent_threshold) {
            LineKind::Tag => {
                self.builder.set_choice_target(parser::parse_tag(&line.text));
                if self.builder.has_pending_choice() && !self.builder.flush_choice() {
                    tracing::debug!(line_no = line.line_no, "choice dropped, node is full");
                }
            }
            _ => self.builder.push_text(&line.text),
        }
        Step::Consumed
    }

    fn close_node(&mut self) {
        let node = self.builder.close();
        let tag = node.tag.clone();
        if self.graph.push(node) {
            tracing::debug!(%tag, "node closed");
        } else {
            tracing::debug!(%tag, max_nodes = self.options.max_nodes, "node dropped, graph is full");
        }
        self.state = State::Idle;
    }

    fn finish_choice_block(&mut self) {
        if self.builder.has_pending_choice() && !self.builder.flush_choice() {
            tracing::debug!("choice dropped, node is full");
        }
        let choices = self.builder.take_choices();
        if !choices.is_empty() {
            let count = choices.len();
            if self.graph.attach_choices(choices) {
                tracing::debug!(count, "choices attached");
            } else {
                tracing::debug!(count, "choice block has no node to attach to");
            }
        }
        self.state = State::Idle;
    }

    fn finish(mut self) -> DialogueGraph {
        match (self.state, self.options.flush_at_end) {
            (State::Dialogue, true) => self.close_node(),
            (State::Choice, true) => self.finish_choice_block(),
            (State::Idle, _) => {}
            (state, false) => tracing::debug!(?state, "input ended inside an open block"),
        }
        if self.builder.has_text() || self.builder.has_commands() {
            tracing::debug!("pending text or commands discarded at end of input");
        }
        tracing::debug!(nodes = self.graph.len(), "compile finished");
        self.graph.into_graph()
    }
}
