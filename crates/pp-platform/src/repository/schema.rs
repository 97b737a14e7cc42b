//! Table definitions, applied idempotently at start-up.

pub(super) const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS accounts (
        id TEXT PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        role TEXT NOT NULL,
        active INTEGER NOT NULL DEFAULT 1,
        created_at INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS clubs (
        id TEXT PRIMARY KEY REFERENCES accounts(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        sport TEXT NOT NULL,
        city TEXT,
        description TEXT,
        contact_email TEXT,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS sponsors (
        id TEXT PRIMARY KEY REFERENCES accounts(id) ON DELETE CASCADE,
        company_name TEXT NOT NULL,
        industry TEXT,
        website TEXT,
        contact_email TEXT,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS budgets (
        id TEXT PRIMARY KEY,
        club_id TEXT NOT NULL REFERENCES clubs(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        season TEXT NOT NULL,
        total_cents INTEGER NOT NULL,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_budgets_club ON budgets(club_id)",
    r#"
    CREATE TABLE IF NOT EXISTS expenses (
        id TEXT PRIMARY KEY,
        budget_id TEXT NOT NULL REFERENCES budgets(id) ON DELETE CASCADE,
        description TEXT NOT NULL,
        amount_cents INTEGER NOT NULL,
        spent_on TEXT NOT NULL,
        category TEXT,
        created_at INTEGER NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_expenses_budget ON expenses(budget_id)",
    r#"
    CREATE TABLE IF NOT EXISTS contracts (
        id TEXT PRIMARY KEY,
        club_id TEXT NOT NULL REFERENCES clubs(id) ON DELETE CASCADE,
        sponsor_id TEXT NOT NULL REFERENCES sponsors(id),
        title TEXT NOT NULL,
        terms TEXT,
        value_cents INTEGER NOT NULL,
        start_date TEXT NOT NULL,
        end_date TEXT NOT NULL,
        status TEXT NOT NULL,
        sign_token TEXT UNIQUE,
        signed_by TEXT,
        signed_at INTEGER,
        viewed_at INTEGER,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_contracts_club ON contracts(club_id)",
    "CREATE INDEX IF NOT EXISTS idx_contracts_sponsor ON contracts(sponsor_id)",
    r#"
    CREATE TABLE IF NOT EXISTS invoices (
        id TEXT PRIMARY KEY,
        club_id TEXT NOT NULL REFERENCES clubs(id) ON DELETE CASCADE,
        sponsor_id TEXT NOT NULL REFERENCES sponsors(id),
        contract_id TEXT REFERENCES contracts(id),
        invoice_number TEXT NOT NULL UNIQUE,
        amount_cents INTEGER NOT NULL,
        issue_date TEXT NOT NULL,
        due_date TEXT NOT NULL,
        status TEXT NOT NULL,
        notes TEXT,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_invoices_club ON invoices(club_id)",
    "CREATE INDEX IF NOT EXISTS idx_invoices_sponsor ON invoices(sponsor_id)",
    r#"
    CREATE TABLE IF NOT EXISTS opportunities (
        id TEXT PRIMARY KEY,
        club_id TEXT NOT NULL REFERENCES clubs(id) ON DELETE CASCADE,
        title TEXT NOT NULL,
        description TEXT,
        category TEXT NOT NULL,
        price_cents INTEGER NOT NULL,
        status TEXT NOT NULL,
        available_from TEXT,
        available_until TEXT,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_opportunities_status ON opportunities(status)",
    r#"
    CREATE TABLE IF NOT EXISTS applications (
        id TEXT PRIMARY KEY,
        opportunity_id TEXT NOT NULL REFERENCES opportunities(id) ON DELETE CASCADE,
        sponsor_id TEXT NOT NULL REFERENCES sponsors(id) ON DELETE CASCADE,
        message TEXT,
        status TEXT NOT NULL,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL,
        UNIQUE (opportunity_id, sponsor_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS inventory_assets (
        id TEXT PRIMARY KEY,
        club_id TEXT NOT NULL REFERENCES clubs(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        asset_type TEXT NOT NULL,
        quantity INTEGER NOT NULL,
        description TEXT,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS bookings (
        id TEXT PRIMARY KEY,
        asset_id TEXT NOT NULL REFERENCES inventory_assets(id) ON DELETE CASCADE,
        club_id TEXT NOT NULL REFERENCES clubs(id) ON DELETE CASCADE,
        sponsor_id TEXT REFERENCES sponsors(id),
        starts_at INTEGER NOT NULL,
        ends_at INTEGER NOT NULL,
        quantity INTEGER NOT NULL,
        status TEXT NOT NULL,
        notes TEXT,
        created_at INTEGER NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_bookings_asset ON bookings(asset_id)",
    r#"
    CREATE TABLE IF NOT EXISTS rights (
        id TEXT PRIMARY KEY,
        club_id TEXT NOT NULL REFERENCES clubs(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        category TEXT NOT NULL,
        exclusive INTEGER NOT NULL DEFAULT 0,
        sponsor_id TEXT REFERENCES sponsors(id),
        start_date TEXT NOT NULL,
        end_date TEXT NOT NULL,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_rights_club ON rights(club_id)",
    r#"
    CREATE TABLE IF NOT EXISTS calendar_events (
        id TEXT PRIMARY KEY,
        club_id TEXT NOT NULL REFERENCES clubs(id) ON DELETE CASCADE,
        title TEXT NOT NULL,
        event_type TEXT NOT NULL,
        starts_at INTEGER NOT NULL,
        ends_at INTEGER NOT NULL,
        location TEXT,
        created_at INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS messages (
        id TEXT PRIMARY KEY,
        sender_id TEXT NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
        recipient_id TEXT NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
        subject TEXT,
        body TEXT NOT NULL,
        read_at INTEGER,
        created_at INTEGER NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_messages_recipient ON messages(recipient_id)",
    r#"
    CREATE TABLE IF NOT EXISTS notifications (
        id TEXT PRIMARY KEY,
        account_id TEXT NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
        kind TEXT NOT NULL,
        title TEXT NOT NULL,
        body TEXT NOT NULL,
        entity_type TEXT,
        entity_id TEXT,
        read_at INTEGER,
        created_at INTEGER NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_notifications_account ON notifications(account_id)",
    r#"
    CREATE TABLE IF NOT EXISTS notes (
        id TEXT PRIMARY KEY,
        author_id TEXT NOT NULL REFERENCES accounts(id),
        entity_type TEXT NOT NULL,
        entity_id TEXT NOT NULL,
        body TEXT NOT NULL,
        created_at INTEGER NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_notes_entity ON notes(entity_type, entity_id)",
    r#"
    CREATE TABLE IF NOT EXISTS tags (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        color TEXT,
        created_at INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tag_assignments (
        tag_id TEXT NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
        entity_type TEXT NOT NULL,
        entity_id TEXT NOT NULL,
        created_at INTEGER NOT NULL,
        PRIMARY KEY (tag_id, entity_type, entity_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS audit_logs (
        id TEXT PRIMARY KEY,
        action TEXT NOT NULL,
        entity_type TEXT NOT NULL,
        entity_id TEXT,
        description TEXT NOT NULL,
        principal_id TEXT,
        principal_role TEXT,
        created_at INTEGER NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_audit_logs_entity ON audit_logs(entity_type, entity_id)",
];
