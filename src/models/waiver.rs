// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Liability waiver shown before joining and signed by joining.

use super::Hike;

const WAIVER_TEMPLATE: &str = include_str!("../../data/waiver.txt");
const PHOTO_RELEASE_SECTION: &str = include_str!("../../data/waiver_photo_release.txt");

/// Stand-in when a hike names no organization.
const NO_ORGANIZATION: &str = "the hike organizers";

/// Where a signature came from, recorded alongside the signed text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaiverSigner {
    pub user_agent: String,
    pub ip_address: String,
}

/// Render the waiver text for a hike.
///
/// The photographic release section is included only for hikes that ask
/// for one.
pub fn render_waiver(hike: &Hike) -> String {
    let organization = hike
        .organization
        .as_deref()
        .filter(|o| !o.trim().is_empty())
        .unwrap_or(NO_ORGANIZATION);
    let photo_release = if hike.photo_release {
        PHOTO_RELEASE_SECTION
    } else {
        ""
    };

    WAIVER_TEMPLATE
        .replace("{{photo_release}}", photo_release)
        .replace("{{leader_name}}", &hike.leader.name)
        .replace("{{organization}}", organization)
}
