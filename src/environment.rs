use std::rc::Rc;

use indexmap::IndexMap;

use crate::{ast::Expr, value::Value};

/// Index of a frame inside [`Frames`].
pub type FrameId = usize;

/// One activation: an operand stack, the names declared in it, and a link to
/// the frame it was opened from.
#[derive(Debug, Default)]
pub struct Frame {
    pub stack: Vec<Value>,
    scope: IndexMap<String, Rc<Expr>>,
    parent: Option<FrameId>,
    /// Nested identifier resolutions and enclosing list blocks.
    pub(crate) depth: usize,
}

impl Frame {
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.scope.keys().map(String::as_str)
    }
}

/// Arena of frames. Children are pushed on top of their parent and popped
/// before the parent continues, so the arena is also the nesting stack.
#[derive(Debug)]
pub struct Frames {
    frames: Vec<Frame>,
}

impl Frames {
    pub const ROOT: FrameId = 0;

    pub fn new() -> Self {
        Self {
            frames: vec![Frame::default()],
        }
    }

    pub fn get(&self, id: FrameId) -> &Frame {
        &self.frames[id]
    }

    pub fn get_mut(&mut self, id: FrameId) -> &mut Frame {
        &mut self.frames[id]
    }

    /// Opens a child with an empty stack and scope. It starts one level past
    /// the parent's depth, so nesting counts against the same ceiling.
    pub fn push_child(&mut self, parent: FrameId) -> FrameId {
        let depth = self.frames[parent].depth + 1;
        self.frames.push(Frame {
            stack: Vec::new(),
            scope: IndexMap::new(),
            parent: Some(parent),
            depth,
        });
        self.frames.len() - 1
    }

    /// Closes the innermost child. The root frame is never popped.
    pub fn pop_child(&mut self) -> Option<Frame> {
        if self.frames.len() > 1 {
            self.frames.pop()
        } else {
            None
        }
    }

    pub fn define(&mut self, id: FrameId, name: String, expr: Rc<Expr>) {
        self.frames[id].scope.insert(name, expr);
    }

    pub fn lookup_local(&self, id: FrameId, name: &str) -> Option<Rc<Expr>> {
        self.frames[id].scope.get(name).cloned()
    }

    /// Searches the ancestors of `id`, nearest first, in their own scopes only.
    pub fn lookup_ancestors(&self, id: FrameId, name: &str) -> Option<Rc<Expr>> {
        let mut cursor = self.frames[id].parent;
        while let Some(ancestor) = cursor {
            let frame = &self.frames[ancestor];
            if let Some(expr) = frame.scope.get(name) {
                return Some(Rc::clone(expr));
            }
            cursor = frame.parent;
        }
        None
    }

    /// Drops every child frame and clears the root's resolution counter.
    pub fn unwind_to_root(&mut self) {
        self.frames.truncate(1);
        self.frames[Self::ROOT].depth = 0;
    }
}

impl Default for Frames {
    fn default() -> Self {
        Self::new()
    }
}
