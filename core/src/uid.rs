// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use jiff::Timestamp;
use jiff::tz::TimeZone;

/// Generate a uid for a continuation series split off an existing one.
///
/// The form is `<UTC stamp>-<uuid v4>@<domain>`, so uids sort by creation
/// time and never collide across hosts.
#[must_use]
pub fn continuation_uid(now: Timestamp, domain: &str) -> String {
    let stamp = TimeZone::UTC.to_datetime(now).strftime("%Y%m%dT%H%M%SZ");
    format!("{stamp}-{}@{domain}", uuid::Uuid::new_v4())
}
