//! The fixed backend schema.

use domain::{TABLE_BOOKINGS, TABLE_REVIEWS, TABLE_SERVICES, TABLE_SUBSCRIPTIONS, TABLE_USERS};

/// Tables the client is allowed to address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Services,
    Bookings,
    Users,
    Reviews,
    Subscriptions,
}

impl Table {
    pub const ALL: [Table; 5] = [
        Table::Services,
        Table::Bookings,
        Table::Users,
        Table::Reviews,
        Table::Subscriptions,
    ];

    /// Literal table name used in request paths
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Services => TABLE_SERVICES,
            Table::Bookings => TABLE_BOOKINGS,
            Table::Users => TABLE_USERS,
            Table::Reviews => TABLE_REVIEWS,
            Table::Subscriptions => TABLE_SUBSCRIPTIONS,
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
