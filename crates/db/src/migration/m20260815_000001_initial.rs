//! Initial schema for the pricing pipeline.
//!
//! Creates the booking mirror, rule store, pricing chain and payment
//! tables. Overlap invariants that the application also checks in code
//! (rule timespans, venue bank links, one live pricing per event) are
//! enforced here with exclusion constraints and partial unique indexes so
//! concurrent writers cannot break them.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(INITIAL_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_SQL).await?;
        Ok(())
    }
}

const INITIAL_SQL: &str = r"
-- btree_gist lets exclusion constraints mix equality columns with ranges
CREATE EXTENSION IF NOT EXISTS btree_gist;

-- ============================================================
-- Enum types
-- ============================================================
CREATE TYPE booking_status AS ENUM ('PENDING', 'CONFIRMED', 'USED', 'CANCELLED', 'REIMBURSED');
CREATE TYPE finance_event_status AS ENUM ('PENDING', 'READY', 'PRICED', 'CANCELLED');
CREATE TYPE pricing_status AS ENUM ('VALIDATED', 'CANCELLED', 'PROCESSED');
CREATE TYPE cashflow_status AS ENUM ('PENDING', 'UNDER_REVIEW', 'ACCEPTED');
CREATE TYPE rule_scope_kind AS ENUM ('STANDARD', 'CUSTOM_OFFER', 'CUSTOM_OFFERER');

-- ============================================================
-- Bookings (mirror of the commercial system, pricing inputs)
-- ============================================================
CREATE TABLE bookings (
    id UUID PRIMARY KEY,
    offer_id UUID NOT NULL,
    offerer_id UUID NOT NULL,
    venue_id UUID NOT NULL,
    subcategory VARCHAR(64),
    amount NUMERIC(12, 2) NOT NULL CHECK (amount >= 0),
    quantity INTEGER NOT NULL CHECK (quantity > 0),
    status booking_status NOT NULL,
    used_date DATE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_used_has_date CHECK (status NOT IN ('USED', 'REIMBURSED') OR used_date IS NOT NULL)
);

CREATE INDEX idx_bookings_venue ON bookings(venue_id);

-- ============================================================
-- Reimbursement rules
-- ============================================================
CREATE TABLE reimbursement_rules (
    id UUID PRIMARY KEY,
    label TEXT NOT NULL,
    scope_kind rule_scope_kind NOT NULL,
    subcategory VARCHAR(64),
    offer_id UUID,
    offerer_id UUID,
    rate NUMERIC(5, 4) CHECK (rate >= 0),
    fixed_amount NUMERIC(12, 2) CHECK (fixed_amount >= 0),
    valid_from DATE NOT NULL,
    valid_until DATE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    -- Exactly one formula per rule
    CONSTRAINT chk_rule_formula CHECK (num_nonnulls(rate, fixed_amount) = 1),
    -- Scope columns must match the scope kind
    CONSTRAINT chk_rule_scope CHECK (
        (scope_kind = 'STANDARD' AND offer_id IS NULL AND offerer_id IS NULL)
        OR (scope_kind = 'CUSTOM_OFFER' AND offer_id IS NOT NULL AND offerer_id IS NULL AND subcategory IS NULL)
        OR (scope_kind = 'CUSTOM_OFFERER' AND offerer_id IS NOT NULL AND offer_id IS NULL AND subcategory IS NULL)
    ),
    CONSTRAINT chk_rule_timespan CHECK (valid_until IS NULL OR valid_until > valid_from),
    -- Same-scope rules never overlap in time; daterange is half-open like
    -- the resolver's [valid_from, valid_until)
    CONSTRAINT excl_rule_overlap EXCLUDE USING gist (
        (scope_kind::text) WITH =,
        (COALESCE(subcategory, '')) WITH =,
        (COALESCE(offer_id, '00000000-0000-0000-0000-000000000000')) WITH =,
        (COALESCE(offerer_id, '00000000-0000-0000-0000-000000000000')) WITH =,
        daterange(valid_from, valid_until) WITH &&
    )
);

-- ============================================================
-- Finance events
-- ============================================================
CREATE TABLE finance_events (
    id UUID PRIMARY KEY,
    booking_id UUID NOT NULL REFERENCES bookings(id),
    status finance_event_status NOT NULL DEFAULT 'PENDING',
    value_date DATE NOT NULL,
    review_reason TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- Batch claim scans by status and value date
CREATE INDEX idx_finance_events_claim ON finance_events(status, value_date)
    WHERE status IN ('PENDING', 'READY');
CREATE INDEX idx_finance_events_booking ON finance_events(booking_id);
CREATE INDEX idx_finance_events_review ON finance_events(updated_at)
    WHERE review_reason IS NOT NULL;

-- ============================================================
-- Pricings (append-only; corrections cancel and re-insert)
-- ============================================================
CREATE TABLE pricings (
    id UUID PRIMARY KEY,
    event_id UUID NOT NULL REFERENCES finance_events(id),
    booking_id UUID NOT NULL REFERENCES bookings(id),
    venue_id UUID NOT NULL,
    rule_id UUID NOT NULL REFERENCES reimbursement_rules(id),
    amount NUMERIC(12, 2) NOT NULL CHECK (amount >= 0),
    pricing_date DATE NOT NULL,
    status pricing_status NOT NULL DEFAULT 'VALIDATED',
    parent_pricing_id UUID REFERENCES pricings(id),
    cashflow_id UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- At most one live pricing per event
CREATE UNIQUE INDEX uq_pricings_live_event ON pricings(event_id)
    WHERE status <> 'CANCELLED';
-- Batch aggregation scans validated, unbatched pricings
CREATE INDEX idx_pricings_batchable ON pricings(pricing_date)
    WHERE status = 'VALIDATED' AND cashflow_id IS NULL;

-- ============================================================
-- Bank accounts and venue links
-- ============================================================
CREATE TABLE bank_accounts (
    id UUID PRIMARY KEY,
    offerer_id UUID NOT NULL,
    label TEXT NOT NULL,
    iban VARCHAR(34) NOT NULL,
    deactivated_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_bank_accounts_offerer ON bank_accounts(offerer_id)
    WHERE deactivated_at IS NULL;

CREATE TABLE venue_bank_links (
    id UUID PRIMARY KEY,
    venue_id UUID NOT NULL,
    bank_account_id UUID NOT NULL REFERENCES bank_accounts(id),
    valid_from DATE NOT NULL,
    valid_until DATE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_link_timespan CHECK (valid_until IS NULL OR valid_until > valid_from),
    -- One bank account per venue at a time
    CONSTRAINT excl_venue_link_overlap EXCLUDE USING gist (
        venue_id WITH =,
        daterange(valid_from, valid_until) WITH &&
    )
);

-- ============================================================
-- Cashflow batches and cashflows
-- ============================================================
CREATE TABLE cashflow_batches (
    id UUID PRIMARY KEY,
    label VARCHAR(32) NOT NULL UNIQUE,
    cutoff DATE NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE cashflows (
    id UUID PRIMARY KEY,
    batch_id UUID NOT NULL REFERENCES cashflow_batches(id),
    bank_account_id UUID NOT NULL REFERENCES bank_accounts(id),
    amount NUMERIC(14, 2) NOT NULL CHECK (amount >= 0),
    status cashflow_status NOT NULL DEFAULT 'PENDING',
    invoice_id UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_cashflows_batch ON cashflows(batch_id);
CREATE INDEX idx_cashflows_billable ON cashflows(bank_account_id)
    WHERE invoice_id IS NULL;

ALTER TABLE pricings
    ADD CONSTRAINT fk_pricings_cashflow FOREIGN KEY (cashflow_id) REFERENCES cashflows(id);

-- ============================================================
-- Invoices and reference numbering
-- ============================================================
CREATE TABLE invoices (
    id UUID PRIMARY KEY,
    reference VARCHAR(16) NOT NULL UNIQUE,
    bank_account_id UUID NOT NULL REFERENCES bank_accounts(id),
    amount NUMERIC(14, 2) NOT NULL CHECK (amount >= 0),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

ALTER TABLE cashflows
    ADD CONSTRAINT fk_cashflows_invoice FOREIGN KEY (invoice_id) REFERENCES invoices(id);

CREATE TABLE reference_schemes (
    id UUID PRIMARY KEY,
    prefix VARCHAR(8) NOT NULL UNIQUE,
    year INTEGER NOT NULL,
    next_number BIGINT NOT NULL DEFAULT 1 CHECK (next_number >= 1),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- ============================================================
-- Feature flags
-- ============================================================
CREATE TABLE feature_flags (
    name VARCHAR(64) PRIMARY KEY,
    enabled BOOLEAN NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const DROP_SQL: &str = r"
DROP TABLE IF EXISTS feature_flags CASCADE;
DROP TABLE IF EXISTS reference_schemes CASCADE;
DROP TABLE IF EXISTS invoices CASCADE;
DROP TABLE IF EXISTS cashflows CASCADE;
DROP TABLE IF EXISTS cashflow_batches CASCADE;
DROP TABLE IF EXISTS venue_bank_links CASCADE;
DROP TABLE IF EXISTS bank_accounts CASCADE;
DROP TABLE IF EXISTS pricings CASCADE;
DROP TABLE IF EXISTS finance_events CASCADE;
DROP TABLE IF EXISTS reimbursement_rules CASCADE;
DROP TABLE IF EXISTS bookings CASCADE;
DROP TYPE IF EXISTS rule_scope_kind;
DROP TYPE IF EXISTS cashflow_status;
DROP TYPE IF EXISTS pricing_status;
DROP TYPE IF EXISTS finance_event_status;
DROP TYPE IF EXISTS booking_status;
";
