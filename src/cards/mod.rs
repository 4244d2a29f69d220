//! Modifier cards: definitions, instances, the catalog and the market.
//!
//! ## Key Types
//!
//! - `CardKind`: every card in the game
//! - `CardDefinition`: static data (cost, attributes, trigger points)
//! - `Card`: one physical card with a stable `CardId`
//! - `CardCatalog`: the query seam the rules engine uses
//! - `Market`: the shared draw and discard piles

pub mod attributes;
pub mod definition;
pub mod instance;
pub mod market;
pub mod registry;
pub mod trigger;

pub use attributes::{AttributeFamily, Attributes, CardAttribute};
pub use definition::{CardDefinition, CardKind, InstantEffect};
pub use instance::{Card, CardId};
pub use market::Market;
pub use registry::{CardCatalog, CardRegistry, TriggeredCards};
pub use trigger::TriggerPoint;
