//! Server-rendered form page. One card of inputs, one card with the five
//! output slots; the Predict button posts the form back to `/predict`.

use crate::{
    schema::{
        bounds, CustomerPatience, NumericInput, RatingHistory, RideForm, VehicleType,
        WeatherCondition, Weekday, Zone,
    },
    trigger::DisplayState,
};

const STYLESHEET: &str =
    "https://cdn.jsdelivr.net/npm/bootswatch@5.3.3/dist/flatly/bootstrap.min.css";

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn select<T: ToString>(out: &mut String, name: &str, label: &str, options: &[T], current: &str) {
    out.push_str(&format!(
        r#"<div class="col-6 mb-3"><label class="form-label" for="{name}">{label}</label><select class="form-select" id="{name}" name="{name}">"#
    ));
    for opt in options {
        let opt = escape(&opt.to_string());
        let selected = if opt == escape(current) { " selected" } else { "" };
        out.push_str(&format!(r#"<option value="{opt}"{selected}>{opt}</option>"#));
    }
    out.push_str("</select></div>");
}

fn slider(out: &mut String, name: &str, label: &str, (min, max, step): (u16, u16, u16), value: &NumericInput) {
    out.push_str(&format!(
        r#"<label class="form-label" for="{name}">{label}</label><input type="range" class="form-range mb-3" id="{name}" name="{name}" min="{min}" max="{max}" step="{step}" value="{}">"#,
        escape(&value.display())
    ));
}

fn number(out: &mut String, name: &str, label: &str, value: &NumericInput) {
    out.push_str(&format!(
        r#"<label class="form-label" for="{name}">{label}</label><input type="number" class="form-control mb-2" id="{name}" name="{name}" value="{}">"#,
        escape(&value.display())
    ));
}

fn inputs(form: &RideForm) -> String {
    let mut out = String::new();

    out.push_str(r#"<div class="row">"#);
    select(&mut out, "vehicle_type", "Vehicle Type", VehicleType::ALL, &form.vehicle_type);
    select(&mut out, "weather_condition", "Weather Condition", WeatherCondition::ALL, &form.weather_condition);
    select(&mut out, "pickup_zone", "Pickup Zone", Zone::ALL, &form.pickup_zone);
    select(&mut out, "drop_zone", "Drop Zone", Zone::ALL, &form.drop_zone);
    select(&mut out, "customer_patience", "Customer Patience", CustomerPatience::ALL, &form.customer_patience);
    select(
        &mut out,
        "historical_customer_rating_binned",
        "History Rating",
        RatingHistory::ALL,
        &form.historical_customer_rating_binned,
    );
    out.push_str("</div>");

    let widen = |(lo, hi): (u8, u8)| (u16::from(lo), u16::from(hi), 1);
    slider(&mut out, "vehicle_arrival_time", "Vehicle Arrival Time (min)", widen(bounds::ARRIVAL_TIME), &form.vehicle_arrival_time);
    slider(&mut out, "distance", "Distance (km)", widen(bounds::DISTANCE), &form.distance);
    let (cost_lo, cost_hi) = bounds::RIDE_COST;
    slider(&mut out, "ride_cost", "Ride Cost (₹)", (cost_lo, cost_hi, 50), &form.ride_cost);
    slider(&mut out, "temperature", "Temperature (°C)", widen(bounds::TEMPERATURE), &form.temperature);

    // Secondary inputs stay collapsed under their defaults.
    out.push_str(r#"<details class="mt-2"><summary>More details</summary><div class="row mt-2"><div class="col-6">"#);
    number(&mut out, "hour", "Hour of Day (0-23)", &form.hour);
    number(&mut out, "humidity", "Humidity (%)", &form.humidity);
    number(&mut out, "precipitation_mm", "Precipitation (mm)", &form.precipitation_mm);
    out.push_str(r#"</div><div class="col-6"><div class="row">"#);
    select(&mut out, "day", "Day of Week", Weekday::ALL, &form.day);
    out.push_str("</div>");
    number(&mut out, "month", "Month", &form.month);
    number(&mut out, "day_of_month", "Day of Month", &form.day_of_month);
    out.push_str("</div></div></details>");

    out
}

fn result_card(d: &DisplayState) -> String {
    format!(
        r#"<h2 id="prediction-text" class="{class} display-4 my-4">{text}</h2><hr>
<h5 class="text-center text-muted">Cancellation Probability:</h5>
<div class="progress mb-3" style="height: 30px"><div id="prob-bar" class="progress-bar progress-bar-striped progress-bar-animated bg-{color}" role="progressbar" style="width: {value}%" aria-valuenow="{value}" aria-valuemin="0" aria-valuemax="100"></div></div>
<p id="prob-text" class="text-center lead">{caption}</p>"#,
        class = escape(&d.text_class),
        text = escape(&d.text),
        color = escape(&d.bar_color),
        value = d.bar_value,
        caption = escape(&d.caption),
    )
}

pub fn render(form: &RideForm, display: &DisplayState) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Uber Ride Cancellation Predictor</title>
<link rel="stylesheet" href="{STYLESHEET}">
</head>
<body>
<div class="container-fluid p-5">
<h1 class="text-center mt-4 mb-2">Uber Ride Cancellation Predictor App</h1>
<h5 class="text-center text-muted mb-5">By Team - When September Ends</h5>
<form method="post" action="/predict" class="row">
<div class="col-12 col-lg-6"><div class="card shadow-sm"><div class="card-header">Ride Details</div><div class="card-body">
{inputs}
</div></div></div>
<div class="col-12 col-lg-6"><div class="card shadow-sm h-100"><div class="card-header bg-primary text-white">Prediction Result</div><div class="card-body">
{result}
<button type="submit" id="btn-predict" class="btn btn-success btn-lg w-100 mt-3">Predict Now</button>
</div></div></div>
</form>
</div>
</body>
</html>
"#,
        inputs = inputs(form),
        result = result_card(display),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trigger::TriggerState;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape(r#"<b a="1">&'"#), "&lt;b a=&quot;1&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn idle_page_lists_every_field_with_defaults_selected() {
        let html = render(&RideForm::default(), &TriggerState::Idle.display());
        for name in crate::schema::FIELD_NAMES {
            assert!(html.contains(&format!(r#"name="{name}""#)), "missing input {name}");
        }
        assert!(html.contains(r#"<option value="Auto" selected>Auto</option>"#));
        assert!(html.contains(r#"<option value="South Delhi" selected>South Delhi</option>"#));
        assert!(html.contains(r#"<option value="Other (Delhi)">Other (Delhi)</option>"#));
        assert!(html.contains("Ready"));
        assert!(html.contains("Click Predict to start"));
        assert!(html.contains("bg-info"));
        assert!(html.contains(r#"<h5 class="text-center text-muted mb-5">By Team - When September Ends</h5>"#));
    }

    #[test]
    fn error_caption_is_escaped() {
        let display = DisplayState {
            text: "Error".into(),
            text_class: "text-danger".into(),
            bar_value: 0.0,
            bar_color: "danger".into(),
            caption: "Prediction failed: unknown day '<x>'".into(),
        };
        let html = render(&RideForm::default(), &display);
        assert!(html.contains("unknown day &#39;&lt;x&gt;&#39;"));
        assert!(!html.contains("<x>"));
    }
}
