//! Print layout geometry.

use booth_model::LayoutKind;
use booth_processing_core::plan_layout;

pub fn run(layout: &str, photos: Option<usize>, json: bool) -> anyhow::Result<()> {
    let layout: LayoutKind = layout.parse()?;
    let config = layout.config();
    let plan = plan_layout(layout, photos.unwrap_or(config.photo_count));

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!("Layout: {} ({})", config.name, layout);
    println!("  {}", config.description);
    println!("  Canvas: {}x{}", plan.width, plan.height);
    println!("  Photos: {} of {}", plan.placements.len() / column_count(layout), config.photo_count);
    println!();
    for p in &plan.placements {
        println!(
            "  photo {} col {}: x={:.1} y={:.1} w={:.1} h={:.1}",
            p.photo_index + 1,
            p.column,
            p.rect.x,
            p.rect.y,
            p.rect.width,
            p.rect.height
        );
    }

    Ok(())
}

fn column_count(layout: LayoutKind) -> usize {
    match layout {
        LayoutKind::Postcard => 1,
        LayoutKind::Strips => booth_processing_core::layout::STRIP_COLUMNS,
    }
}
