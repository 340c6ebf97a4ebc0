//! Initial database migration.
//!
//! Creates all enums, tables, constraints, and indexes for the treasury
//! ledger: directory tables, sale orders, credits and payments, delivery
//! batches with their line items, site expenses, sales returns,
//! closeouts, and the sequence counters.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: DIRECTORY TABLES
        // ============================================================
        db.execute_unprepared(SITES_SQL).await?;
        db.execute_unprepared(WORKERS_SQL).await?;
        db.execute_unprepared(CLIENTS_SQL).await?;

        // ============================================================
        // PART 3: SALES & CREDIT LEDGER
        // ============================================================
        db.execute_unprepared(SALE_ORDERS_SQL).await?;
        db.execute_unprepared(CREDITS_SQL).await?;
        db.execute_unprepared(PAYMENTS_SQL).await?;
        db.execute_unprepared(SALES_RETURNS_SQL).await?;

        // ============================================================
        // PART 4: CASH DELIVERIES
        // ============================================================
        db.execute_unprepared(DELIVERY_BATCHES_SQL).await?;
        db.execute_unprepared(DELIVERY_LINE_ITEMS_SQL).await?;
        db.execute_unprepared(SITE_EXPENSES_SQL).await?;

        // ============================================================
        // PART 5: CLOSEOUTS
        // ============================================================
        db.execute_unprepared(CLOSEOUTS_SQL).await?;

        // ============================================================
        // PART 6: SEQUENCE COUNTERS
        // ============================================================
        db.execute_unprepared(COUNTERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Sale order kind
CREATE TYPE order_kind AS ENUM ('cash', 'credit');

-- Sale order lifecycle
CREATE TYPE order_status AS ENUM ('draft', 'finalized', 'voided');

-- Credit lifecycle
CREATE TYPE credit_status AS ENUM ('open', 'closed', 'overdue', 'voided');

-- Installment payment method
CREATE TYPE payment_method AS ENUM ('cash', 'transfer', 'card', 'check', 'other');

-- Delivery batch lifecycle
CREATE TYPE delivery_status AS ENUM ('draft', 'confirmed');
";

const SITES_SQL: &str = r"
CREATE TABLE sites (
    id UUID PRIMARY KEY,
    name VARCHAR(120) NOT NULL,
    city VARCHAR(120),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const WORKERS_SQL: &str = r"
CREATE TABLE workers (
    id UUID PRIMARY KEY,
    site_id UUID NOT NULL REFERENCES sites(id),
    full_name VARCHAR(160) NOT NULL,
    role VARCHAR(60),
    active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_workers_site ON workers(site_id);
";

const CLIENTS_SQL: &str = r"
CREATE TABLE clients (
    id UUID PRIMARY KEY,
    name VARCHAR(160) NOT NULL,
    tax_id VARCHAR(40),
    is_special BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const SALE_ORDERS_SQL: &str = r"
CREATE TABLE sale_orders (
    id UUID PRIMARY KEY,
    site_id UUID NOT NULL REFERENCES sites(id),
    worker_id UUID REFERENCES workers(id),
    client_id UUID REFERENCES clients(id),
    order_number BIGINT NOT NULL,
    kind order_kind NOT NULL,
    status order_status NOT NULL DEFAULT 'draft',
    issued_on DATE NOT NULL,
    subtotal NUMERIC(18,2) NOT NULL,
    discount_total NUMERIC(18,2) NOT NULL DEFAULT 0,
    tax_total NUMERIC(18,2) NOT NULL DEFAULT 0,
    total NUMERIC(18,2) NOT NULL,
    source_retention_enabled BOOLEAN NOT NULL DEFAULT FALSE,
    source_retention_percent NUMERIC(7,3) NOT NULL DEFAULT 0,
    source_retention_amount NUMERIC(18,2) NOT NULL DEFAULT 0,
    ica_retention_enabled BOOLEAN NOT NULL DEFAULT FALSE,
    ica_retention_percent NUMERIC(7,3) NOT NULL DEFAULT 0,
    ica_retention_amount NUMERIC(18,2) NOT NULL DEFAULT 0,
    notes TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_sale_orders_number UNIQUE (site_id, order_number),
    CONSTRAINT chk_sale_orders_amounts CHECK (subtotal >= 0 AND total >= 0)
);

CREATE INDEX idx_sale_orders_site_date ON sale_orders(site_id, issued_on);
CREATE INDEX idx_sale_orders_client ON sale_orders(client_id);
";

const CREDITS_SQL: &str = r"
CREATE TABLE credits (
    id UUID PRIMARY KEY,
    sale_order_id UUID NOT NULL REFERENCES sale_orders(id),
    site_id UUID NOT NULL REFERENCES sites(id),
    client_id UUID REFERENCES clients(id),
    credit_total NUMERIC(18,2) NOT NULL,
    paid_total NUMERIC(18,2) NOT NULL DEFAULT 0,
    pending_balance NUMERIC(18,2) NOT NULL,
    status credit_status NOT NULL DEFAULT 'open',
    opened_on DATE NOT NULL,
    closed_on DATE,
    notes TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    -- One credit per sale order
    CONSTRAINT uq_credits_order UNIQUE (sale_order_id)
);

CREATE INDEX idx_credits_client_status ON credits(client_id, status);
CREATE INDEX idx_credits_site ON credits(site_id);
";

const PAYMENTS_SQL: &str = r"
CREATE TABLE payments (
    id UUID PRIMARY KEY,
    credit_id UUID NOT NULL REFERENCES credits(id),
    amount NUMERIC(18,2) NOT NULL,
    paid_on DATE NOT NULL,
    method payment_method NOT NULL,
    receipt_ref VARCHAR(80),
    balance_after NUMERIC(18,2) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_payments_amount CHECK (amount > 0)
);

CREATE INDEX idx_payments_credit ON payments(credit_id);
CREATE INDEX idx_payments_date ON payments(paid_on);
";

const SALES_RETURNS_SQL: &str = r"
CREATE TABLE sales_returns (
    id UUID PRIMARY KEY,
    sale_order_id UUID NOT NULL REFERENCES sale_orders(id),
    amount NUMERIC(18,2) NOT NULL,
    reason TEXT,
    returned_on DATE NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_sales_returns_amount CHECK (amount > 0)
);

CREATE INDEX idx_sales_returns_order ON sales_returns(sale_order_id);
";

const DELIVERY_BATCHES_SQL: &str = r"
CREATE TABLE delivery_batches (
    id UUID PRIMARY KEY,
    site_id UUID NOT NULL REFERENCES sites(id),
    employee_id UUID NOT NULL REFERENCES workers(id),
    delivery_date DATE NOT NULL,
    period_start DATE NOT NULL,
    period_end DATE NOT NULL,
    status delivery_status NOT NULL DEFAULT 'draft',
    expected_amount NUMERIC(18,2) NOT NULL DEFAULT 0,
    expense_total NUMERIC(18,2) NOT NULL DEFAULT 0,
    declared_cash NUMERIC(18,2) NOT NULL DEFAULT 0,
    declared_transfer NUMERIC(18,2) NOT NULL DEFAULT 0,
    declared_check NUMERIC(18,2) NOT NULL DEFAULT 0,
    declared_deposit NUMERIC(18,2) NOT NULL DEFAULT 0,
    declared_total NUMERIC(18,2) NOT NULL DEFAULT 0,
    variance NUMERIC(18,2),
    voucher_number BIGINT,
    notes TEXT,
    confirmed_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_delivery_period CHECK (period_start <= period_end),
    CONSTRAINT uq_delivery_voucher UNIQUE (site_id, voucher_number)
);

CREATE INDEX idx_delivery_batches_site_date ON delivery_batches(site_id, delivery_date);
";

const DELIVERY_LINE_ITEMS_SQL: &str = r"
CREATE TABLE delivery_line_items (
    id UUID PRIMARY KEY,
    batch_id UUID NOT NULL REFERENCES delivery_batches(id) ON DELETE CASCADE,
    sale_order_id UUID REFERENCES sale_orders(id),
    payment_id UUID REFERENCES payments(id),
    amount NUMERIC(18,2) NOT NULL,
    description TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    -- Exactly one claim target per line item
    CONSTRAINT chk_line_item_target CHECK (
        (sale_order_id IS NOT NULL AND payment_id IS NULL) OR
        (sale_order_id IS NULL AND payment_id IS NOT NULL)
    )
);

-- A sale order or payment is claimable by at most one live batch.
-- Deleting a draft batch cascades here, releasing its claims.
CREATE UNIQUE INDEX uq_line_items_order
    ON delivery_line_items(sale_order_id) WHERE sale_order_id IS NOT NULL;
CREATE UNIQUE INDEX uq_line_items_payment
    ON delivery_line_items(payment_id) WHERE payment_id IS NOT NULL;

CREATE INDEX idx_line_items_batch ON delivery_line_items(batch_id);
";

const SITE_EXPENSES_SQL: &str = r"
CREATE TABLE site_expenses (
    id UUID PRIMARY KEY,
    site_id UUID NOT NULL REFERENCES sites(id),
    batch_id UUID REFERENCES delivery_batches(id) ON DELETE SET NULL,
    concept VARCHAR(200) NOT NULL,
    amount NUMERIC(18,2) NOT NULL,
    incurred_on DATE NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_site_expenses_amount CHECK (amount > 0)
);

CREATE INDEX idx_site_expenses_site_date ON site_expenses(site_id, incurred_on);
CREATE INDEX idx_site_expenses_batch ON site_expenses(batch_id);
";

const CLOSEOUTS_SQL: &str = r"
CREATE TABLE closeouts (
    id UUID PRIMARY KEY,
    client_id UUID NOT NULL REFERENCES clients(id),
    performed_by UUID NOT NULL REFERENCES workers(id),
    notes TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_closeouts_client ON closeouts(client_id);

CREATE TABLE closeout_items (
    id UUID PRIMARY KEY,
    closeout_id UUID NOT NULL REFERENCES closeouts(id) ON DELETE CASCADE,
    credit_id UUID NOT NULL REFERENCES credits(id),
    order_number BIGINT NOT NULL,
    credit_total NUMERIC(18,2) NOT NULL,
    prior_balance NUMERIC(18,2) NOT NULL
);

CREATE INDEX idx_closeout_items_closeout ON closeout_items(closeout_id);
";

const COUNTERS_SQL: &str = r"
CREATE TABLE counters (
    scope VARCHAR(40) NOT NULL,
    site_id UUID NOT NULL REFERENCES sites(id),
    value BIGINT NOT NULL DEFAULT 0,

    PRIMARY KEY (scope, site_id)
);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS counters;
DROP TABLE IF EXISTS closeout_items;
DROP TABLE IF EXISTS closeouts;
DROP TABLE IF EXISTS site_expenses;
DROP TABLE IF EXISTS delivery_line_items;
DROP TABLE IF EXISTS delivery_batches;
DROP TABLE IF EXISTS sales_returns;
DROP TABLE IF EXISTS payments;
DROP TABLE IF EXISTS credits;
DROP TABLE IF EXISTS sale_orders;
DROP TABLE IF EXISTS clients;
DROP TABLE IF EXISTS workers;
DROP TABLE IF EXISTS sites;

DROP TYPE IF EXISTS delivery_status;
DROP TYPE IF EXISTS payment_method;
DROP TYPE IF EXISTS credit_status;
DROP TYPE IF EXISTS order_status;
DROP TYPE IF EXISTS order_kind;
";
