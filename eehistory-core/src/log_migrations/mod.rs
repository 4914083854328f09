//! Event log schema, embedded with include_str!
//!
//! Applied in order by `LoggingService`. `000_migrations.sql` creates the
//! bookkeeping table and must stay first.

pub const LOG_MIGRATIONS: &[(&str, &str)] = &[
    ("000_migrations.sql", include_str!("000_migrations.sql")),
    ("001_initial_schema.sql", include_str!("001_initial_schema.sql")),
    ("002_event_details.sql", include_str!("002_event_details.sql")),
];
