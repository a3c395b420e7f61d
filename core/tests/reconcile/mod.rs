// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! End-to-end reconciliation scenarios.

mod edit_all;
mod messages;
mod single;
mod split;
