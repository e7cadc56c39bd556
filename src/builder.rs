use crate::bounded::BoundedVec;
use crate::compiler::CompileOptions;
use crate::types::{Choice, Command, DialogueGraph, DialogueNode};

/// Pending pieces of the node currently being built.
///
/// The text buffer is shared: dialogue lines of an open node and the text of
/// a choice entry both accumulate here.
#[derive(Debug)]
pub struct NodeBuilder {
    text: String,
    pending_tag: String,
    character_id: Option<String>,
    commands: BoundedVec<Command>,
    choices: BoundedVec<Choice>,
    choice_target: Option<String>,
    tag_prefix: String,
    next_id: usize,
}

impl NodeBuilder {
    pub fn new(options: &CompileOptions) -> Self {
        let mut builder = Self {
            text: String::new(),
            pending_tag: String::new(),
            character_id: None,
            commands: BoundedVec::new(options.max_commands),
            choices: BoundedVec::new(options.max_choices),
            choice_target: None,
            tag_prefix: options.default_tag_prefix.clone(),
            next_id: 0,
        };
        builder.pending_tag = builder.synthesize_tag();
        builder
    }

    fn synthesize_tag(&mut self) -> String {
        let tag = format!("{}{}", self.tag_prefix, self.next_id);
        self.next_id += 1;
        tag
    }

    pub fn push_text(&mut self, line: &str) {
        if !self.text.is_empty() {
            self.text.push('\n');
        }
        self.text.push_str(line);
    }

    pub fn has_text(&self) -> bool {
        !self.text.is_empty()
    }

    #[cfg(test)]
    fn pending_tag(&self) -> &str {
        &self.pending_tag
    }

    pub fn set_tag(&mut self, tag: String) {
        self.pending_tag = tag;
    }

    pub fn set_character(&mut self, character_id: String) {
        self.character_id = Some(character_id);
    }

    pub fn push_command(&mut self, command: Command) -> bool {
        self.commands.try_push(command)
    }

    pub fn has_commands(&self) -> bool {
        !self.commands.is_empty()
    }

    pub fn set_choice_target(&mut self, target: Option<String>) {
        self.choice_target = target;
    }

    pub fn has_pending_choice(&self) -> bool {
        self.has_text() || self.choice_target.is_some()
    }

    /// Moves the pending choice text and target into the choice buffer.
    ///
    /// Returns `false` when there was nothing pending or the buffer was full.
    pub fn flush_choice(&mut self) -> bool {
        if !self.has_pending_choice() {
            return false;
        }
        let choice = Choice {
            text: std::mem::take(&mut self.text),
            target_tag: self.choice_target.take().unwrap_or_default(),
        };
        self.choices.try_push(choice)
    }

    pub fn take_choices(&mut self) -> Vec<Choice> {
        self.choices.take()
    }

    /// Snapshots the pending state into a node and queues a synthesized tag
    /// for whichever node closes next. The speaker carries over.
    pub fn close(&mut self) -> DialogueNode {
        let next = self.synthesize_tag();
        let tag = std::mem::replace(&mut self.pending_tag, next);
        DialogueNode {
            tag,
            character_id: self.character_id.clone(),
            text: std::mem::take(&mut self.text),
            commands: self.commands.take(),
            choices: Vec::new(),
        }
    }
}

/// Collects closed nodes up to the node capacity.
#[derive(Debug)]
pub struct GraphAssembler {
    nodes: BoundedVec<DialogueNode>,
    last_recorded: bool,
}

impl GraphAssembler {
    pub fn new(max_nodes: usize) -> Self {
        Self {
            nodes: BoundedVec::new(max_nodes),
            last_recorded: false,
        }
    }

    pub fn push(&mut self, node: DialogueNode) -> bool {
        self.last_recorded = self.nodes.try_push(node);
        self.last_recorded
    }

    /// Replaces the choices of the most recently closed node. Fails when no
    /// node has closed yet or the last closure was dropped.
    pub fn attach_choices(&mut self, choices: Vec<Choice>) -> bool {
        if !self.last_recorded {
            return false;
        }
        match self.nodes.last_mut() {
            Some(node) => {
                node.choices = choices;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn into_graph(self) -> DialogueGraph {
        DialogueGraph {
            nodes: self.nodes.into_vec(),
        }
    }
}
