//! Shared fixtures for domain service tests.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use crate::domain::{Principal, PrincipalId, Role};

pub(crate) fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 9, 15, 0)
        .single()
        .expect("valid fixture timestamp")
}

pub(crate) struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: fixture_timestamp(),
    })
}

pub(crate) fn principal_with_role(role: Role) -> Principal {
    let id = PrincipalId::random();
    Principal::new(id, format!("{}@example.test", role.as_str()), None, role)
}

pub(crate) fn student() -> Principal {
    principal_with_role(Role::User)
}

pub(crate) fn admin() -> Principal {
    principal_with_role(Role::Admin)
}

pub(crate) fn super_admin() -> Principal {
    principal_with_role(Role::SuperAdmin)
}
