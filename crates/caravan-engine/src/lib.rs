//! Derived-stat engine for caravans.
//!
//! Resolves travelers and wagons against their registries, rolls attached
//! items up into counts and cargo, and runs the modifier pipeline that
//! produces every derived value on the caravan sheet. Also covers the
//! actions a caravan takes: resting, selling treasure, and rolling tests
//! and attacks.

pub mod aggregate;
pub mod buff_target;
pub mod changes;
pub mod checks;
pub mod config;
pub mod counts;
pub mod derive;
pub mod dice;
pub mod error;
pub mod formula;
pub mod merge;
pub mod message;
pub mod notes;
pub mod registry;
pub mod rest;
pub mod treasure;
pub mod validate;

pub use aggregate::{Aggregates, aggregate};
pub use checks::{AttackResult, TestAttribute, TestResult, attack, attribute_test};
pub use config::{ConvertOptions, RestOptions};
pub use counts::{CaravanCounts, CountSummary, counts};
pub use derive::{DerivedCaravan, derive_caravan, derive_with_roster};
pub use dice::{DiceExpr, DicePool, Die, DieResult, RollResult};
pub use error::{EngineError, EngineResult};
pub use formula::{Formula, RollData};
pub use merge::{Bound, Roster};
pub use notes::{NoteGroup, context_notes};
pub use registry::{Registries, Registry, TravelerRole, WagonType};
pub use rest::{RestOutcome, RestReport, rest};
pub use treasure::{ConvertOutcome, ConvertReport, convert_treasure};
pub use validate::{ValidationIssue, validate_caravan};
