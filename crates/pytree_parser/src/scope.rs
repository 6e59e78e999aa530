//! The lexical scope tracker.
//!
//! A stack of namespaces mirroring the global scope, open class bodies,
//! and open function bodies. The tracker answers the parse-time questions
//! that drive desugaring: does an assignment create a new binding (emit a
//! declaration) or reuse one (emit a plain assignment), is a called name
//! a known class (emit a constructor call), and which parameter name is
//! the current method's instance alias.
//!
//! "Does this binding exist" deliberately consults only the innermost
//! frame: assignment in a function body shadows rather than reaching
//! outward, which is how the local-scope-creates-new-binding rule of the
//! surface language is modeled in a single forward pass.

use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamespaceKind {
    Global,
    Function,
    Class,
}

/// What a name is bound to, as far as the parser can tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Variable,
    Function,
    Class,
}

#[derive(Debug)]
struct Namespace {
    kind: NamespaceKind,
    bindings: FxHashMap<String, BindingKind>,
    /// The parameter name bound to the receiver in a method frame.
    this_alias: Option<String>,
}

impl Namespace {
    fn new(kind: NamespaceKind) -> Self {
        Self {
            kind,
            bindings: FxHashMap::default(),
            this_alias: None,
        }
    }
}

#[derive(Debug)]
pub struct ScopeTracker {
    stack: Vec<Namespace>,
}

impl Default for ScopeTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTracker {
    pub fn new() -> Self {
        Self {
            stack: vec![Namespace::new(NamespaceKind::Global)],
        }
    }

    pub fn enter_function(&mut self) {
        self.stack.push(Namespace::new(NamespaceKind::Function));
    }

    pub fn enter_class(&mut self) {
        self.stack.push(Namespace::new(NamespaceKind::Class));
    }

    pub fn exit(&mut self) {
        debug_assert!(self.stack.len() > 1);
        self.stack.pop();
    }

    fn current(&self) -> &Namespace {
        self.stack.last().expect("scope stack is never empty")
    }

    fn current_mut(&mut self) -> &mut Namespace {
        self.stack.last_mut().expect("scope stack is never empty")
    }

    pub fn declare(&mut self, name: &str, kind: BindingKind) {
        self.current_mut().bindings.insert(name.to_string(), kind);
    }

    /// Whether the name is bound in the innermost frame.
    pub fn exists(&self, name: &str) -> bool {
        self.current().bindings.contains_key(name)
    }

    /// Whether the name is bound in any enclosing frame. Class frames are
    /// skipped unless innermost: a class body is not a lexical scope for
    /// the functions nested inside it.
    pub fn bound_anywhere(&self, name: &str) -> bool {
        for (depth, frame) in self.stack.iter().enumerate().rev() {
            let innermost = depth == self.stack.len() - 1;
            if frame.kind == NamespaceKind::Class && !innermost {
                continue;
            }
            if frame.bindings.contains_key(name) {
                return true;
            }
        }
        false
    }

    /// Whether a call to this name should become a constructor call.
    ///
    /// Walks outward; the first frame that binds the name decides, so a
    /// function binding shadowing a class name of the same spelling wins
    /// and the call stays an ordinary call.
    pub fn is_known_constructor(&self, name: &str) -> bool {
        for frame in self.stack.iter().rev() {
            if let Some(kind) = frame.bindings.get(name) {
                return *kind == BindingKind::Class;
            }
        }
        false
    }

    /// Whether any enclosing frame is a function body.
    pub fn in_function(&self) -> bool {
        self.stack
            .iter()
            .any(|frame| frame.kind == NamespaceKind::Function)
    }

    /// Whether the innermost frame is a class body.
    pub fn in_class_frame(&self) -> bool {
        self.current().kind == NamespaceKind::Class
    }

    pub fn this_alias(&self) -> Option<&str> {
        self.current().this_alias.as_deref()
    }

    pub fn set_this_alias(&mut self, name: &str) {
        self.current_mut().this_alias = Some(name.to_string());
    }
}
