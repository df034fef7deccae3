//! Human-readable report rendering for terminal output.
use colored::*;

use crate::analytics::{ReportData, pct};

fn visible_len(s: &str) -> usize {
    // Strip ANSI escape sequences (\x1b[ ... m) to compute printable width
    let mut len = 0;
    let mut iter = s.chars().peekable();
    while let Some(ch) = iter.next() {
        if ch == '\u{1b}' {
            if let Some('[') = iter.peek().cloned() {
                let _ = iter.next();
            }
            for c in iter.by_ref() {
                if c == 'm' {
                    break;
                }
            }
        } else {
            len += 1;
        }
    }
    len
}

fn section_header(title: &str) -> String {
    let len = visible_len(title);
    let mut s = String::new();
    s.push('\n');
    s.push_str(title);
    s.push('\n');
    s.push_str(&"─".repeat(len));
    s.push_str("\n\n");
    s
}

pub fn render_report(data: &ReportData) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{}\n",
        "hashcathelper: Password Cracking Results".bold().cyan()
    ));

    let n = data.accounts;
    let mut lines: Vec<String> = Vec::new();
    lines.push(format!("Accounts: {}", n));
    for (label, count) in [
        ("Cracked", data.cracked),
        ("Nonunique", data.nonunique),
        ("User equals password", data.user_equals_password),
        ("LM hashes", data.lm_hash_count),
        ("Empty password", data.empty_password),
    ] {
        lines.push(format!("{}: {} ({})", label, count, pct(count, n)));
    }
    lines.push(format!(
        "Average password length: {:.2}",
        data.average_password_length
    ));
    out.push_str(&section_header(
        &"Password Statistics".bold().yellow().to_string(),
    ));
    for line in lines {
        out.push_str(&line);
        out.push('\n');
    }

    if data.censored {
        out.push_str(&format!(
            "Largest baseword cluster: {}\n",
            data.largest_baseword_cluster
        ));
        return out;
    }
    out.push_str(&section_header(
        &"Top Basewords".bold().magenta().to_string(),
    ));
    if data.top_basewords.is_empty() {
        out.push_str("(No cracked passwords)\n");
    } else {
        for (word, count) in &data.top_basewords {
            out.push_str(&format!("  {}: {}\n", word, count));
        }
    }
    out
}
