pub mod annulus;
pub mod beta;
pub mod geometry;

pub use annulus::{AnnulusMask, AnnulusSelector};
pub use beta::{BetaCoefficient, BetaEvaluator, EvaluatorInput};
pub use geometry::{GeometryBuilder, GeometryGrids};
