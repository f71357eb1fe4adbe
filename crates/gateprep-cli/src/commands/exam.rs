use chrono::Local;
use gateprep_core::Preferences;

pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let prefs = Preferences::load()?;
    let days = prefs.days_until_exam(Local::now().date_naive());

    if json {
        let out = serde_json::json!({
            "title": prefs.exam.title,
            "date": prefs.exam.date,
            "days_left": days,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{}: {days} days left ({})", prefs.exam.title, prefs.exam.date);
    }
    Ok(())
}
