use serde_json::json;
use slippy::prelude::*;

/// Drives a map without any UI: layers in, draw commands and events out
fn main() -> slippy::Result<()> {
    env_logger::init();

    println!("Slippy Headless Example");
    println!("=======================");

    let mut map = MapBuilder::new()
        .with_source(WebMercatorSource::new(2, 16))
        .with_view_size(1024, 768)
        .with_start_level(10)
        .build()?;

    let san_francisco = LatLng::new(37.7749, -122.4194);
    map.goto_position(san_francisco);
    println!(
        "Map at level {}, view offset ({}, {})",
        map.level(),
        map.viewport().view_offset_x,
        map.viewport().view_offset_y
    );
    let home = TileCoord::from_lat_lng(&san_francisco, map.level());
    let centre = map.viewport().view_extent.center();
    println!("Home tile: {}", map.source().url(home));
    println!("View extent centre: {:.4}, {:.4}", centre.lat, centre.lng);

    // Map-frame entities are (x, y) = (longitude, latitude)
    let places = map.add_point_layer(
        vec![
            PointEntity::new(-122.4194, 37.7749)
                .with_colour(Colour::RED)
                .with_radius(5.0)
                .with_data(json!({"name": "San Francisco"})),
            PointEntity::new(-122.2712, 37.8044)
                .with_colour(Colour::BLUE)
                .with_data(json!({"name": "Oakland"})),
        ],
        LayerOptions::map_relative()
            .with_name("places")
            .with_selectable(true),
    )?;
    map.add_layer_from_json(
        LayerKind::Text,
        &json!([
            [-122.4194, 37.7749, "San Francisco"],
            [-122.2712, 37.8044, "Oakland", {"textcolour": "blue"}]
        ]),
        LayerOptions::map_relative().with_name("labels"),
        Some(&json!({"fontsize": 10})),
    )?;
    map.add_text_layer(
        vec![TextEntity::for_frame(10.0, 10.0, "Bay Area", ReferenceFrame::View)
            .with_placement(Placement::Nw)],
        LayerOptions::view_relative().with_name("title"),
    )?;
    println!("Added {} layers", map.registry().len());

    let mut context = RenderContext::new();
    map.render(&mut context, &FixedWidthMeasurer::default());
    let tiles: Vec<String> = context
        .commands()
        .iter()
        .filter_map(|command| match command {
            DrawCommand::Tile { tile, .. } => Some(map.source().url(*tile)),
            _ => None,
        })
        .collect();
    println!("\nFrame {}: {} tiles", context.frame(), tiles.len());
    if let Some(first) = tiles.first() {
        println!("   first tile: {}", first);
    }
    for command in context.commands().iter().filter(|c| !c.is_tile()) {
        println!("   {:?}", command);
    }

    // Click on San Francisco
    let click = map.viewport().geo_to_view(map.source(), san_francisco);
    map.handle_input(InputEvent::PointerDown {
        position: click,
        button: MouseButton::Left,
        modifiers: KeyModifiers::default(),
    });
    map.handle_input(InputEvent::PointerUp {
        position: click,
        button: MouseButton::Left,
        modifiers: KeyModifiers::default(),
    });

    // Zoom in about the centre, then drag the map
    map.handle_input(InputEvent::Scroll {
        delta: 1.0,
        position: click,
    });
    map.handle_input(InputEvent::PointerDown {
        position: Point::new(500.0, 400.0),
        button: MouseButton::Left,
        modifiers: KeyModifiers::default(),
    });
    map.handle_input(InputEvent::PointerMove {
        position: Point::new(450.0, 380.0),
    });
    map.handle_input(InputEvent::PointerUp {
        position: Point::new(450.0, 380.0),
        button: MouseButton::Left,
        modifiers: KeyModifiers::default(),
    });

    println!("\nEvents:");
    for event in map.take_events() {
        match event {
            MapEvent::PointSelect(select) if select.layer_id == places => {
                let name = select
                    .selection
                    .as_ref()
                    .and_then(|s| s.data.as_ref())
                    .and_then(|data| data.get("name"))
                    .and_then(|name| name.as_str())
                    .map(str::to_string);
                println!("   clicked {:?} in layer {}", name, select.layer_id);
            }
            MapEvent::PositionChange {
                position: Some(position),
            } => {
                println!("   pointer at {:.4}, {:.4}", position.lat, position.lng);
            }
            other => println!("   {:?}", other),
        }
    }

    println!(
        "\nNow at level {}, redraw needed: {}",
        map.level(),
        map.take_redraw_request()
    );
    Ok(())
}
