//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application. They own the transaction boundaries: every mutating
//! operation locks its target rows and commits atomically.

pub mod closeout;
pub mod credit;
pub mod delivery;
pub mod directory;
pub mod expense;
pub mod sale_order;
pub mod sales_return;
pub mod sequence;

pub use closeout::{CloseoutRepoError, CloseoutRepository, CloseoutWithItems};
pub use credit::{
    CreditRepoError, CreditRepository, CreditWithPayments, UpdateWithholdingInput,
};
pub use delivery::{
    BatchDetails, CreateBatchInput, DeliveryRepoError, DeliveryRepository, EligibleOrder,
    EligiblePayment,
};
pub use directory::{DirectoryError, DirectoryRepository};
pub use expense::{ExpenseError, ExpenseRepository};
pub use sale_order::{CreateSaleOrderInput, SaleOrderError, SaleOrderRepository};
pub use sales_return::{SalesReturnError, SalesReturnRepository};
pub use sequence::SequenceRepository;
