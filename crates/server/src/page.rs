//! The single HTML page served by the front end.

const PREDICTION_SLOT: &str = "{{prediction_text}}";

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Transaction Anomaly Screening</title>
    <style>
        body { font-family: sans-serif; margin: 2em auto; max-width: 40em; background: #f5f5f5; color: #333; }
        form { background: white; border-radius: 8px; padding: 1.5em; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }
        label { display: block; margin-top: 0.8em; font-weight: bold; }
        input { width: 100%; padding: 0.4em; box-sizing: border-box; }
        button { margin-top: 1.2em; padding: 0.6em 1.5em; background: #2563eb; color: white; border: 0; border-radius: 4px; }
        .result { margin-top: 1.5em; font-size: 1.2em; font-weight: bold; }
    </style>
</head>
<body>
    <h1>Transaction Anomaly Screening</h1>
    <form action="/predict" method="post">
        <label for="FISCAL_YR">Fiscal Year</label>
        <input type="number" id="FISCAL_YR" name="FISCAL_YR" required>
        <label for="FISCAL_MTH">Fiscal Month</label>
        <input type="number" id="FISCAL_MTH" name="FISCAL_MTH" required>
        <label for="DIV_NAME">Division Name</label>
        <input type="text" id="DIV_NAME" name="DIV_NAME" required>
        <label for="MERCHANT">Merchant</label>
        <input type="text" id="MERCHANT" name="MERCHANT" required>
        <label for="CAT_DESC">Category Description</label>
        <input type="text" id="CAT_DESC" name="CAT_DESC" required>
        <label for="AMT">Amount</label>
        <input type="number" step="any" id="AMT" name="AMT" required>
        <label for="Year">Year</label>
        <input type="number" id="Year" name="Year" required>
        <label for="Month">Month</label>
        <input type="number" id="Month" name="Month" required>
        <label for="DayOfWeek">Day of Week</label>
        <input type="number" id="DayOfWeek" name="DayOfWeek" required>
        <label for="FiscalQuarter">Fiscal Quarter</label>
        <input type="number" id="FiscalQuarter" name="FiscalQuarter" required>
        <button type="submit">Predict</button>
    </form>
    <div class="result">{{prediction_text}}</div>
</body>
</html>
"#;

/// Render the form page, optionally with a result line.
pub fn render(prediction_text: Option<&str>) -> String {
    INDEX_HTML.replace(PREDICTION_SLOT, &escape(prediction_text.unwrap_or_default()))
}

/// Escape text for an HTML element body.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_without_prediction() {
        let html = render(None);
        assert!(!html.contains(PREDICTION_SLOT));
        assert!(html.contains(r#"<div class="result"></div>"#));
        for field in screening::COLUMNS {
            assert!(html.contains(&format!(r#"name="{field}""#)), "missing input {field}");
        }
    }

    #[test]
    fn test_render_with_prediction() {
        let html = render(Some("This is a normal transaction."));
        assert!(html.contains(r#"<div class="result">This is a normal transaction.</div>"#));
    }

    #[test]
    fn test_prediction_is_escaped() {
        let html = render(Some("Error: invalid value for AMT: '<script>' (x & y)"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&#39;&lt;script&gt;&#39; (x &amp; y)"));
    }

    #[test]
    fn test_escape_plain_text_unchanged() {
        assert_eq!(escape("This transaction is anomalous!"), "This transaction is anomalous!");
    }
}
