use html_escaper::Escape;

use funds::{Amount, ProgressView, Standing, progress::format_amount};

const TITLE: &str = "Area 49 SDA Youth Choir FundsReflect";

fn standing_line(standing: &Standing) -> String {
    let class = match standing {
        Standing::Remaining(_) => "remaining",
        Standing::GoalReached => "goal-reached",
        Standing::Surplus(_) => "surplus"
    };
    let prefix = match standing {
        Standing::Remaining(_) => "",
        _ => "🎉 "
    };
    format!(r#"<p class="standing {}">{}{}</p>"#, class, prefix, standing)
}

/// Height of a bar in percent of the chart, given the axis maximum.
fn bar_height(value: Amount, max: Amount) -> f64 {
    if max <= 0.0 {
        return 0.0;
    }
    (value / max * 100.0).clamp(0.0, 100.0)
}

fn bar(name: &str, value: Amount, max: Amount) -> String {
    format!(concat!(
        r#"<div class="bar" title="{value} Kwacha">"#,
        r#"<div class="bar-fill" style="height: {height:.2}%"></div>"#,
        r#"<span class="bar-label">{name}</span>"#,
        "</div>"),
        value = format_amount(value),
        height = bar_height(value, max),
        name = name)
}

fn chart(view: &ProgressView) -> String {
    let max = view.chart_max();
    format!(concat!(
        r#"<div class="chart">"#,
        r#"<div class="axis"><span>{top}</span><span>0</span></div>"#,
        r#"<div class="bars">{goal}{raised}</div>"#,
        "</div>"),
        top = format_amount(max),
        goal = bar("Goal", view.goal, max),
        raised = bar("Raised", view.amount, max))
}

/// Renders the whole page. `input` is what goes back into the
/// contribution field, so a rejected value stays where the user typed it.
pub fn render(view: &ProgressView, input: &str) -> String {
    let celebration = if view.goal_reached {
        r#"<div class="confetti" aria-hidden="true"></div>"#
    } else {
        ""
    };

    format!(r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="stylesheet" href="/static/style.css">
</head>
<body>
{celebration}
<main>
<h1>{title} 🎯</h1>
<form method="post" action="/contribute">
<input type="number" name="amount" placeholder="Enter amount" step="any" min="0" value="{input}">
<button type="submit">Add</button>
</form>
<div class="current">Current Amount: {amount} Kwacha</div>
{standing}
{chart}
<p class="goal">Goal: {goal} Kwacha</p>
</main>
</body>
</html>
"#,
        title = TITLE,
        celebration = celebration,
        input = std::fmt::from_fn(|f| input.escape(f, false)),
        amount = format_amount(view.amount),
        standing = standing_line(&view.standing),
        chart = chart(view),
        goal = format_amount(view.goal))
}


#[cfg(test)]
mod tests {
    use super::{bar_height, render};

    use funds::{GOAL, ProgressView};

    #[test]
    fn below_goal() {
        let html = render(&ProgressView::new(500_000.0, GOAL), "");

        assert!(html.contains("Current Amount: 500,000 Kwacha"));
        assert!(html.contains("Remaining: 1,500,000 Kwacha"));
        assert!(html.contains("Goal: 2,000,000 Kwacha"));
        assert!(!html.contains("Goal Reached"));
        assert!(!html.contains("confetti"));
    }

    #[test]
    fn at_goal_shows_only_goal_reached() {
        let html = render(&ProgressView::new(GOAL, GOAL), "");

        assert!(html.contains("🎉 Goal Reached!</p>"));
        assert!(!html.contains("Remaining"));
        assert!(!html.contains("Surplus"));
        assert!(html.contains("confetti"));
    }

    #[test]
    fn above_goal_shows_surplus() {
        let html = render(&ProgressView::new(2_050_000.0, GOAL), "");

        assert!(html.contains("Goal Reached! Surplus: 50,000 Kwacha"));
        assert!(html.contains("confetti"));
        // the raised bar is the tallest one once the goal is passed
        assert!(html.contains(r#"style="height: 100.00%""#));
    }

    #[test]
    fn keeps_and_escapes_input() {
        let html = render(&ProgressView::new(0.0, GOAL), r#""><script>"#);
        assert!(html.contains(r#"value="&quot;&gt;&lt;script&gt;""#));
    }

    #[test]
    fn bars_scale_to_axis() {
        assert_eq!(bar_height(500_000.0, GOAL), 25.0);
        assert_eq!(bar_height(GOAL, GOAL), 100.0);
        assert_eq!(bar_height(1.0, 0.0), 0.0);
    }

    #[test]
    fn escapes_markup_in_input() {
        let html = render(&ProgressView::new(0.0, GOAL), "a & b <c>");
        assert!(html.contains(r#"value="a &amp; b &lt;c&gt;""#));
    }
}
