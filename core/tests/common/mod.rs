// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Common test utilities for integration tests.
//!
//! This module provides shared test infrastructure including:
//! - Test data factories (fixtures)
//! - Custom assertion helpers

mod assertions;
mod fixtures;

#[allow(unused_imports)]
pub use assertions::{assert_no_failures, assert_unique_identities, exception_ids};
#[allow(unused_imports)]
pub use fixtures::{
    DAILY1_UID, EventText, TEST_ZONE, WHOLE_DAY_UID, daily1, daily1_instance, daily1_zoned, message,
    setup, test_config, whole_day,
};
