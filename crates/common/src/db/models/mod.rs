//! SeaORM entity models
//!
//! Database entities for the GridSage metadata store

mod transformer;

pub use transformer::{
    Entity as TransformerEntity,
    Model as TransformerRecord,
    ActiveModel as TransformerActiveModel,
    Column as TransformerColumn,
};
