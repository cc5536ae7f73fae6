//! Domain types: reference entities and the order aggregate

#[macro_use]
pub mod macros;

pub mod address;
pub mod delivery_place;
pub mod exporter;
pub mod importer;
pub mod material;
pub mod operation;
pub mod order;
pub mod point;
pub mod process;
pub mod user;

pub use address::Address;
pub use delivery_place::DeliveryPlace;
pub use exporter::{Currency, Exporter, Incoterm, LeadTimes, PaymentTerms};
pub use importer::Importer;
pub use material::Material;
pub use operation::{Operation, OperationType};
pub use order::{Event, Item, Modal, Order, OrderChanges, OrderDraft, OrderSortKey, OrderStatus};
pub use point::Point;
pub use process::Process;
pub use user::User;
