//! Ready-made functions: the example catalogue and pathological generators.

mod examples;
mod pathological;

pub use examples::{examples, Difficulty, Example, SeedPair};
pub use pathological::{
    ill_conditioned, multimodal, oscillatory, weierstrass, Characteristics, PathologicalFunction,
    PathologicalKind,
};
