//! `coursebot course` — Show the course-information store.

use coursebot_core::course::CourseInfo;

pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let info = CourseInfo::sample();

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("📢 Announcements");
    for (i, announcement) in info.announcements().iter().enumerate() {
        println!("  {}. {announcement}", i + 1);
    }

    println!();
    println!("📝 Assignments");
    for (name, assignment) in info.assignments() {
        println!("  {name}: {} (due {})", assignment.title, assignment.due_date);
        println!("    {}", assignment.requirements);
        for (criterion, weight) in &assignment.grading {
            println!("    - {criterion}: {:.0}%", weight * 100.0);
        }
    }

    println!();
    println!("📚 Topics");
    for (topic, summary) in info.topics() {
        println!("  {topic}: {summary}");
    }

    Ok(())
}
