//! Fragment builders for wire swaps.

use chrono::{DateTime, Utc};

use crate::compliance::model::ComplianceRecord;
use crate::incidents::model::Incident;
use crate::orgs::model::{Membership, Org, OrgInvite, Role};
use crate::store::User;
use crate::ui::html::escape;

/// The members panel: member rows, open invitations, and the invite form.
/// Rendered whole on every membership mutation, matching the original
/// `_members.html` partial.
pub fn members_panel(
    org: &Org,
    rows: &[(Membership, User)],
    invitations: &[OrgInvite],
    acting_role: Option<Role>,
    ok: Option<&str>,
    error: Option<&str>,
    now: DateTime<Utc>,
) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        r#"<div id="members-block" data-org="{}">"#,
        org.id
    ));
    out.push_str(&format!("<h2>Members of {}</h2>", escape(&org.name)));

    if let Some(ok) = ok {
        out.push_str(&format!(r#"<div class="flash flash-ok">{}</div>"#, escape(ok)));
    }
    if let Some(error) = error {
        out.push_str(&format!(
            r#"<div class="flash flash-error">{}</div>"#,
            escape(error)
        ));
    }

    // Owners manage members; admins (and owners) manage invitations.
    let manages_members = acting_role == Some(Role::Owner);
    let manages_invites = acting_role.map(|r| r >= Role::Admin).unwrap_or(false);

    out.push_str("<table class=\"members\"><thead><tr><th>User</th><th>Role</th><th>Status</th><th></th></tr></thead><tbody>");
    for (membership, user) in rows {
        out.push_str("<tr>");
        out.push_str(&format!("<td>{}</td>", escape(user.display())));

        if manages_members {
            out.push_str(&format!(
                r##"<td><select name="role" hx-post="/orgs/{}/members/{}/role" hx-target="#members-block" hx-swap="outerHTML">"##,
                org.id, membership.id
            ));
            for role in Role::ALL {
                let selected = if role == membership.role { " selected" } else { "" };
                out.push_str(&format!(
                    r#"<option value="{}"{}>{}</option>"#,
                    role.as_str(),
                    selected,
                    role.label()
                ));
            }
            out.push_str("</select></td>");
        } else {
            out.push_str(&format!("<td>{}</td>", membership.role.label()));
        }

        out.push_str(&format!(
            "<td>{}</td>",
            if membership.is_active { "Active" } else { "Inactive" }
        ));

        if manages_members {
            let (label, flip) = if membership.is_active {
                ("Deactivate", "0")
            } else {
                ("Reactivate", "1")
            };
            out.push_str(&format!(
                r##"<td><button hx-post="/orgs/{}/members/{}/toggle" hx-vals='{{"active": "{}"}}' hx-target="#members-block" hx-swap="outerHTML">{}</button></td>"##,
                org.id, membership.id, flip, label
            ));
        } else {
            out.push_str("<td></td>");
        }
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table>");

    out.push_str("<h3>Invitations</h3><table class=\"invitations\"><tbody>");
    for invite in invitations {
        let status = invite.status(now);
        out.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td>",
            escape(&invite.email),
            invite.role.label(),
            status.label()
        ));
        if manages_invites && invite.is_pending(now) {
            out.push_str(&format!(
                r##"<td><button hx-post="/orgs/{}/invites/{}/cancel" hx-target="#members-block" hx-swap="outerHTML">Cancel</button></td>"##,
                org.id, invite.id
            ));
        } else {
            out.push_str("<td></td>");
        }
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table>");

    // Admins may invite; the guard on the endpoint is authoritative.
    out.push_str(&format!(
        r##"<form hx-post="/orgs/{}/invites" hx-target="#members-block" hx-swap="outerHTML">
<input type="email" name="email" placeholder="email" required>
<select name="role"><option value="member">Member</option><option value="admin">Admin</option></select>
<button type="submit">Invite</button>
</form>"##,
        org.id
    ));

    out.push_str("</div>");
    out
}

/// One incident status cell. Keeps the id the table row targets.
pub fn status_cell(incident: &Incident, dom_prefix: &str) -> String {
    format!(
        r#"<td id="{}-status-{}" class="status status-{}">{}</td>"#,
        escape(dom_prefix),
        incident.id,
        incident.status.as_str(),
        incident.status.as_str()
    )
}

/// Timer cell content: countdown, overdue, or the filed duration.
fn timer_text(incident: &Incident, window_hours: i64, now: DateTime<Utc>) -> String {
    match incident.seconds_to_deadline(window_hours, now) {
        None => match crate::incidents::annex::reported_hm(incident.aware_at, incident.reported_at)
        {
            Some(hm) => format!("reported after {}", hm),
            None => "reported".to_string(),
        },
        Some(secs) if secs < 0 => "OVERDUE".to_string(),
        Some(secs) => {
            let hours = secs / 3600;
            let minutes = (secs % 3600) / 60;
            format!("{}h {:02}m left", hours, minutes)
        }
    }
}

/// One incident timer cell.
pub fn timer_cell(incident: &Incident, window_hours: i64, now: DateTime<Utc>, dom_prefix: &str) -> String {
    let overdue = incident.reported_at.is_none() && incident.is_overdue(window_hours, now);
    format!(
        r#"<td id="{}-timer-{}" class="timer{}">{}</td>"#,
        escape(dom_prefix),
        incident.id,
        if overdue { " overdue" } else { "" },
        timer_text(incident, window_hours, now)
    )
}

/// Out-of-band variant of the timer cell, swapped alongside the status
/// cell on report submission.
pub fn timer_cell_oob(
    incident: &Incident,
    window_hours: i64,
    now: DateTime<Utc>,
    dom_prefix: &str,
) -> String {
    let overdue = incident.reported_at.is_none() && incident.is_overdue(window_hours, now);
    format!(
        r#"<td id="{}-timer-{}" hx-swap-oob="true" class="timer{}">{}</td>"#,
        escape(dom_prefix),
        incident.id,
        if overdue { " overdue" } else { "" },
        timer_text(incident, window_hours, now)
    )
}

/// The incidents table for an org.
pub fn incidents_block(
    org: &Org,
    incidents: &[Incident],
    window_hours: i64,
    now: DateTime<Utc>,
) -> String {
    let dom_prefix = "incidents-block";
    let mut out = String::new();
    out.push_str(&format!(r#"<div id="{}" data-org="{}">"#, dom_prefix, org.id));
    out.push_str("<table class=\"incidents\"><thead><tr><th>Title</th><th>Class</th><th>Severity</th><th>Status</th><th>Clock</th><th></th></tr></thead><tbody>");
    for incident in incidents {
        out.push_str(&format!("<tr id=\"{}-row-{}\">", dom_prefix, incident.id));
        out.push_str(&format!("<td>{}</td>", escape(&incident.title)));
        out.push_str(&format!("<td>{}</td>", incident.classification.label()));
        out.push_str(&format!("<td>{}</td>", incident.severity.as_str()));
        out.push_str(&status_cell(incident, dom_prefix));
        out.push_str(&timer_cell(incident, window_hours, now, dom_prefix));
        if incident.reported_at.is_none() {
            out.push_str(&format!(
                r##"<td><button hx-post="/orgs/{}/incidents/{}/submit-report" hx-target="#{}-status-{}" hx-swap="outerHTML">Report submitted</button></td>"##,
                org.id, incident.id, dom_prefix, incident.id
            ));
        } else {
            out.push_str("<td></td>");
        }
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table></div>");
    out
}

/// The compliance records table for an org, with its status filter.
pub fn records_block(org: &Org, records: &[ComplianceRecord]) -> String {
    let mut out = String::new();
    out.push_str(&format!(r#"<div id="records-block" data-org="{}">"#, org.id));
    out.push_str(&format!(
        r##"<form hx-get="/orgs/{}/records" hx-target="#records-block" hx-swap="outerHTML">
<select name="status"><option value="">All</option><option value="pending">Pending</option><option value="complete">Complete</option><option value="failed">Failed</option></select>
<button type="submit">Filter</button>
</form>"##,
        org.id
    ));
    out.push_str("<table class=\"records\"><thead><tr><th>Requirement</th><th>Status</th><th>Updated</th></tr></thead><tbody>");
    for record in records {
        out.push_str(&format!(
            "<tr><td>{}</td><td class=\"status-{}\">{}</td><td>{}</td></tr>",
            escape(&record.requirement),
            record.status.as_str(),
            record.status.label(),
            record.last_updated.format("%Y-%m-%d %H:%M")
        ));
    }
    out.push_str("</tbody></table></div>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::incidents::model::{Classification, IncidentStatus, Severity};
    use chrono::Duration;

    fn org() -> Org {
        Org {
            id: 1,
            name: "Grid <North>".into(),
            description: String::new(),
            created_by: 1,
            created_at: Utc::now(),
        }
    }

    fn incident(now: DateTime<Utc>) -> Incident {
        Incident {
            id: 9,
            org_id: 1,
            title: "Feeder outage".into(),
            classification: Classification::Availability,
            severity: Severity::High,
            status: IncidentStatus::Open,
            aware_at: now,
            reported_at: None,
            report_notes: String::new(),
            report_reference: String::new(),
            description: String::new(),
            owner: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_members_panel_escapes_names_and_shows_error() {
        let now = Utc::now();
        let membership = Membership {
            id: 2,
            user_id: 3,
            org_id: 1,
            role: Role::Member,
            is_active: true,
            invited_by: None,
            invited_at: None,
            accepted_at: Some(now),
        };
        let user = User {
            id: 3,
            username: "alice".into(),
            email: "a@example.com".into(),
            display_name: "Alice <script>".into(),
            password_sha256: String::new(),
        };

        let html = members_panel(
            &org(),
            &[(membership, user)],
            &[],
            Some(Role::Owner),
            None,
            Some("Only owners can perform this action."),
            now,
        );

        assert!(html.contains("Alice &lt;script&gt;"));
        assert!(html.contains("Grid &lt;North&gt;"));
        assert!(html.contains("flash-error"));
        assert!(html.contains(r#"id="members-block""#));
    }

    #[test]
    fn test_member_view_hides_controls() {
        let now = Utc::now();
        let html = members_panel(&org(), &[], &[], Some(Role::Member), None, None, now);
        assert!(!html.contains("hx-post=\"/orgs/1/members"));
    }

    #[test]
    fn test_timer_cell_states() {
        let now = Utc::now();
        let mut inc = incident(now);

        let ticking = timer_cell(&inc, 72, now + Duration::hours(70), "incidents-block");
        assert!(ticking.contains("2h 00m left"));

        let overdue = timer_cell(&inc, 72, now + Duration::hours(73), "incidents-block");
        assert!(overdue.contains("OVERDUE"));

        inc.submit_report(None, None, now + Duration::hours(5));
        let reported = timer_cell(&inc, 72, now + Duration::hours(80), "incidents-block");
        assert!(reported.contains("reported after 5h 00m"));
    }

    #[test]
    fn test_oob_timer_cell_carries_swap_attribute() {
        let now = Utc::now();
        let inc = incident(now);
        let html = timer_cell_oob(&inc, 72, now, "incidents-block");
        assert!(html.contains(r#"hx-swap-oob="true""#));
        assert!(html.contains("incidents-block-timer-9"));
    }
}
