//! Database enum mappings.
//!
//! Each enum mirrors a pure domain enum from `tesoro-core`; the `From`
//! conversions keep the two in lockstep so repositories never match on
//! raw strings.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use tesoro_core::credit::types as core;
use tesoro_core::delivery::types::DeliveryStatus as CoreDeliveryStatus;

/// Sale order kind: contado or credito.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "order_kind")]
pub enum OrderKind {
    /// Cash sale.
    #[sea_orm(string_value = "cash")]
    Cash,
    /// Credit sale.
    #[sea_orm(string_value = "credit")]
    Credit,
}

/// Sale order lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "order_status")]
pub enum OrderStatus {
    /// Order being assembled.
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Order finalized into the ledger.
    #[sea_orm(string_value = "finalized")]
    Finalized,
    /// Order annulled.
    #[sea_orm(string_value = "voided")]
    Voided,
}

/// Credit lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "credit_status")]
pub enum CreditStatus {
    /// Balance outstanding.
    #[sea_orm(string_value = "open")]
    Open,
    /// Balance settled.
    #[sea_orm(string_value = "closed")]
    Closed,
    /// Past the grace period.
    #[sea_orm(string_value = "overdue")]
    Overdue,
    /// Annulled, balance frozen.
    #[sea_orm(string_value = "voided")]
    Voided,
}

/// Payment method for an installment.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_method")]
pub enum PaymentMethod {
    /// Cash.
    #[sea_orm(string_value = "cash")]
    Cash,
    /// Bank transfer.
    #[sea_orm(string_value = "transfer")]
    Transfer,
    /// Card.
    #[sea_orm(string_value = "card")]
    Card,
    /// Check.
    #[sea_orm(string_value = "check")]
    Check,
    /// Other.
    #[sea_orm(string_value = "other")]
    Other,
}

/// Delivery batch lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "delivery_status")]
pub enum DeliveryStatus {
    /// Batch being assembled.
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Batch confirmed and locked.
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
}

impl From<core::OrderKind> for OrderKind {
    fn from(value: core::OrderKind) -> Self {
        match value {
            core::OrderKind::Cash => Self::Cash,
            core::OrderKind::Credit => Self::Credit,
        }
    }
}

impl From<OrderKind> for core::OrderKind {
    fn from(value: OrderKind) -> Self {
        match value {
            OrderKind::Cash => Self::Cash,
            OrderKind::Credit => Self::Credit,
        }
    }
}

impl From<core::OrderStatus> for OrderStatus {
    fn from(value: core::OrderStatus) -> Self {
        match value {
            core::OrderStatus::Draft => Self::Draft,
            core::OrderStatus::Finalized => Self::Finalized,
            core::OrderStatus::Voided => Self::Voided,
        }
    }
}

impl From<OrderStatus> for core::OrderStatus {
    fn from(value: OrderStatus) -> Self {
        match value {
            OrderStatus::Draft => Self::Draft,
            OrderStatus::Finalized => Self::Finalized,
            OrderStatus::Voided => Self::Voided,
        }
    }
}

impl From<core::CreditStatus> for CreditStatus {
    fn from(value: core::CreditStatus) -> Self {
        match value {
            core::CreditStatus::Open => Self::Open,
            core::CreditStatus::Closed => Self::Closed,
            core::CreditStatus::Overdue => Self::Overdue,
            core::CreditStatus::Voided => Self::Voided,
        }
    }
}

impl From<CreditStatus> for core::CreditStatus {
    fn from(value: CreditStatus) -> Self {
        match value {
            CreditStatus::Open => Self::Open,
            CreditStatus::Closed => Self::Closed,
            CreditStatus::Overdue => Self::Overdue,
            CreditStatus::Voided => Self::Voided,
        }
    }
}

impl From<core::PaymentMethod> for PaymentMethod {
    fn from(value: core::PaymentMethod) -> Self {
        match value {
            core::PaymentMethod::Cash => Self::Cash,
            core::PaymentMethod::Transfer => Self::Transfer,
            core::PaymentMethod::Card => Self::Card,
            core::PaymentMethod::Check => Self::Check,
            core::PaymentMethod::Other => Self::Other,
        }
    }
}

impl From<PaymentMethod> for core::PaymentMethod {
    fn from(value: PaymentMethod) -> Self {
        match value {
            PaymentMethod::Cash => Self::Cash,
            PaymentMethod::Transfer => Self::Transfer,
            PaymentMethod::Card => Self::Card,
            PaymentMethod::Check => Self::Check,
            PaymentMethod::Other => Self::Other,
        }
    }
}

impl From<CoreDeliveryStatus> for DeliveryStatus {
    fn from(value: CoreDeliveryStatus) -> Self {
        match value {
            CoreDeliveryStatus::Draft => Self::Draft,
            CoreDeliveryStatus::Confirmed => Self::Confirmed,
        }
    }
}

impl From<DeliveryStatus> for CoreDeliveryStatus {
    fn from(value: DeliveryStatus) -> Self {
        match value {
            DeliveryStatus::Draft => Self::Draft,
            DeliveryStatus::Confirmed => Self::Confirmed,
        }
    }
}
