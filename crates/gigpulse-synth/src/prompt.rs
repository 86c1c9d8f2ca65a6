//! Prompt construction for the generative path

use crate::anomaly::Anomaly;
use crate::report::{title_line, BriefInput, SECTION_HEADERS};
use serde_json::json;

/// System instruction: skeleton, budget and anomaly rule
#[must_use]
pub fn system_instruction(input: &BriefInput, word_budget: usize, threshold: f64) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let pct = (threshold * 100.0).round() as u32;
    format!(
        "You write a daily business brief for a freelancer selling on Fiverr and Upwork.\n\
         Reply with plain text only, at most {word_budget} words, in exactly this layout:\n\
         \n\
         {title}\n\
         \n\
         {h0}\n<metric lines>\n\
         \n\
         {h1}\n<metric lines>\n\
         \n\
         {h2}\n<numbered list of at most 3 jobs>\n\
         \n\
         {h3}\n<bulleted actions for today>\n\
         \n\
         Flag any metric that dropped more than {pct}% since yesterday. \
         Write `No data this run.` under a platform with no snapshot. \
         Use `--` for missing numbers. Do not invent numbers.",
        title = title_line(input.day, input.date),
        h0 = SECTION_HEADERS[0],
        h1 = SECTION_HEADERS[1],
        h2 = SECTION_HEADERS[2],
        h3 = SECTION_HEADERS[3],
    )
}

/// User prompt: today's and yesterday's data plus locally computed anomalies
#[must_use]
pub fn user_prompt(input: &BriefInput, anomalies: &[Anomaly], top_matches: usize) -> String {
    let payload = json!({
        "date": input.date.format("%Y-%m-%d").to_string(),
        "day": input.day,
        "today": input.today,
        "yesterday": input.yesterday,
        "top_matches": input.top_matches(top_matches),
        "anomalies": anomalies,
    });
    let body = serde_json::to_string_pretty(&payload).unwrap_or_else(|_| payload.to_string());
    format!("Metrics for today's brief:\n\n{body}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::DayMetrics;
    use chrono::NaiveDate;

    #[test]
    fn system_instruction_carries_rules() {
        let input = BriefInput {
            date: NaiveDate::from_ymd_opt(2026, 10, 17).unwrap(),
            day: 4,
            today: DayMetrics::default(),
            yesterday: DayMetrics::default(),
        };
        let system = system_instruction(&input, 300, 0.2);
        assert!(system.contains("at most 300 words"));
        assert!(system.contains("more than 20%"));
        assert!(system.contains("GIGPULSE DAILY BRIEF | Day 4 | 2026-10-17"));
        for header in SECTION_HEADERS {
            assert!(system.contains(header));
        }
    }

    #[test]
    fn user_prompt_embeds_anomalies() {
        let input = BriefInput {
            date: NaiveDate::from_ymd_opt(2026, 10, 17).unwrap(),
            day: 4,
            today: DayMetrics::default(),
            yesterday: DayMetrics::default(),
        };
        let prompt = user_prompt(&input, &[], 3);
        assert!(prompt.contains("\"anomalies\": []"));
        assert!(prompt.contains("\"today\""));
    }
}
