//! Plain-text rendering for command results.

use std::fmt::Write;

use estate_client::{BlockLayout, ClientConfig, FlatView, Phase, StatusTally};
use estate_core::{Customer, FlatPayment, Page, Project};

pub fn projects(projects: &[Project]) -> String {
    if projects.is_empty() {
        return "No projects.".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<16} {:<28} {:>6} {:>6} {:>6} {:>6}",
        "ID", "NAME", "FLATS", "FREE", "BOOKED", "SOLD"
    );
    for p in projects {
        let _ = writeln!(
            out,
            "{:<16} {:<28} {:>6} {:>6} {:>6} {:>6}",
            p.project_id,
            p.name,
            p.total_apartments,
            p.free_apartments,
            p.booked_apartments,
            p.sold_apartments
        );
    }
    out.trim_end().to_string()
}

pub fn flats(layout: &BlockLayout, counts: &StatusTally) -> String {
    let mut out = String::new();
    for (block, floors) in layout {
        let _ = writeln!(out, "Block {}", block);
        for (floor, flats) in floors {
            let cells: Vec<String> = flats
                .iter()
                .map(|f| format!("{} [{}]", f.flat_number, f.status))
                .collect();
            let _ = writeln!(out, "  Floor {:>3}: {}", floor, cells.join("  "));
        }
    }
    let _ = write!(
        out,
        "{} flats: {} free, {} booked, {} sold",
        counts.total(),
        counts.free,
        counts.booked,
        counts.sold
    );
    out
}

pub fn flat_view(view: &FlatView) -> String {
    let flat = &view.flat;
    let phase = match view.display.phase {
        Phase::Tentative => "pending confirmation",
        Phase::Confirmed => "confirmed",
    };

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Flat {} ({})  block {}, floor {}, {} BHK, {} sqft",
        flat.flat_number,
        flat.key(),
        flat.block,
        flat.floor,
        flat.bedrooms,
        flat.square_feet
    );
    let _ = writeln!(out, "Status: {} ({})", view.display.status, phase);

    if let Some(booking) = &view.booking {
        let _ = writeln!(
            out,
            "Customer: {} ({})",
            booking.customer_name, booking.customer_id
        );
        let _ = write!(
            out,
            "Total: {}  Paid: {}  Remaining: {}",
            booking.total_payment,
            booking.paid,
            booking.remaining()
        );
        if view.loan_approved() {
            out.push_str("  [loan approved]");
        }
        out.push('\n');
    }

    if view.history.is_empty() {
        out.push_str("No payments recorded.");
    } else {
        out.push_str("Payments:");
        for payment in &view.history {
            let _ = write!(out, "\n  {}", payment_line(payment));
        }
    }
    out
}

fn payment_line(payment: &FlatPayment) -> String {
    format!(
        "{}  {:>16}  {:<28} {}",
        payment.created_at.format("%Y-%m-%d"),
        payment.amount.to_string(),
        payment.summary.describe(),
        payment.payment_id
    )
}

pub fn payments(page: &Page<FlatPayment>) -> String {
    let mut out = String::new();
    for payment in &page.items {
        let customer = payment
            .customer
            .name
            .as_deref()
            .unwrap_or(&payment.customer.id);
        let _ = writeln!(
            out,
            "{}  {}/{}  {}",
            payment_line(payment),
            payment.project_name,
            payment.flat_id,
            customer
        );
    }
    out.push_str(&footer(page));
    out
}

pub fn customers(page: &Page<Customer>) -> String {
    let mut out = String::new();
    for c in &page.items {
        let _ = writeln!(out, "{:<26} {:<28} {:<15} {}", c.id, c.name, c.phone, c.status);
    }
    out.push_str(&footer(page));
    out
}

pub fn config(config: &ClientConfig) -> String {
    let path = ClientConfig::default_config_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "base_url = {}\nrequest_timeout_secs = {}\nuser_agent = {}\ndefault file: {}",
        config.api.base_url, config.api.request_timeout_secs, config.api.user_agent, path
    )
}

fn footer<T>(page: &Page<T>) -> String {
    if page.items.is_empty() {
        return "No results.".to_string();
    }
    let mut footer = format!(
        "Page {} of {} ({} total)",
        page.current_page,
        page.total_pages.max(1),
        page.total_count
    );
    if page.has_next() {
        footer.push_str(", use --page for more");
    }
    footer
}
