//! pytree_ast: The output tree of the pytree front end.
//!
//! Node kinds follow the ESTree / Mozilla Parser API vocabulary so that an
//! unrelated downstream printer can generate code from the tree directly.
//! Nodes are owned by their parents, built bottom-up, and never mutated
//! after construction; `Clone` is the one structural deep-clone used when
//! a parsed fragment must be duplicated into two desugared branches.

pub mod node;
mod serialize;

pub use node::*;
