use agenda_core::Agenda;
use anyhow::Result;
use owo_colors::OwoColorize;

pub fn run() -> Result<()> {
    let mut agenda = Agenda::load()?;
    let glyphs = agenda.config().glyphs();
    let departments = agenda.departments()?;

    if departments.is_empty() {
        println!(
            "{}",
            format!("No sources in {}", agenda.config().sources_path().display()).dimmed()
        );
        return Ok(());
    }

    for department in &departments {
        println!("{} {}", glyphs.glyph(department), department);
    }

    Ok(())
}
