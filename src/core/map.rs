use crate::{
    core::{
        config::MapConfig,
        geo::{LatLng, Point},
        viewport::Viewport,
    },
    input::{
        events::{
            BoxSelect, EventKind, EventManager, InputEvent, KeyModifiers, MapEvent, MouseButton,
            PointSelect,
        },
        handler::{Action, InputHandler},
    },
    layers::{
        base::{Layer, LayerId, LayerKind, LayerOptions},
        data::entities_from_json,
        entity::{
            hotspot_geo, ImageEntity, LayerEntities, PointEntity, PolygonEntity, TextEntity,
        },
        hit_test::{box_select, point_select},
        manager::LayerRegistry,
        placement::{resolve, PlacementInput, PrimitiveFamily, ReferenceFrame},
    },
    rendering::{
        commands::DrawCommand,
        context::{RenderContext, TextMeasurer},
    },
    tiles::TileSource,
    MapError, Result,
};
use crossbeam_channel::{unbounded, Receiver};
use std::collections::BTreeSet;

/// One zoom step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

/// A tiled map with layers: the host forwards input and size changes, draws
/// the commands from [`SlippyMap::render`] and reacts to the emitted events.
///
/// Everything runs on the owning thread. The only thing arriving from
/// elsewhere is the tile source's availability callback, which is funnelled
/// through a channel and picked up by [`SlippyMap::poll_tile_updates`].
pub struct SlippyMap<S: TileSource> {
    viewport: Viewport,
    source: S,
    registry: LayerRegistry,
    events: EventManager,
    handler: InputHandler,
    config: MapConfig,
    needs_redraw: bool,
    tile_updates: Receiver<(u8, u32, u32)>,
}

impl<S: TileSource> SlippyMap<S> {
    /// Takes ownership of `source` and shows the configured start level,
    /// centred on the map
    pub fn new(mut source: S, config: MapConfig) -> Result<Self> {
        let range = config.resolve_levels(&source)?;

        let (sender, receiver) = unbounded();
        source.set_available_callback(Box::new(move |level, x, y| {
            // the map is gone if the receiver is
            let _ = sender.send((level, x, y));
        }));

        source.use_level(range.start);
        if Viewport::map_size(&source).is_none() {
            return Err(MapError::InvalidConfig(format!(
                "start level {} is too large to show",
                range.start
            )));
        }

        let viewport = Viewport::new(&mut source, config.view_size, range.min, range.max, range.start);
        let registry =
            LayerRegistry::new(range.min, range.max).with_default_delta(config.selection_delta);

        log::debug!(
            "map created: levels {}..={} starting at {}, view {}x{}",
            range.min,
            range.max,
            range.start,
            viewport.view_width,
            viewport.view_height
        );

        Ok(Self {
            viewport,
            source,
            registry,
            events: EventManager::new(),
            handler: InputHandler::new(),
            config,
            needs_redraw: true,
            tile_updates: receiver,
        })
    }

    // View

    /// New view size in pixels
    pub fn on_resize(&mut self, width: u32, height: u32) {
        self.viewport.resize(&self.source, width, height);
        self.needs_redraw = true;
    }

    /// The pointer dragged the map by `delta` view pixels
    pub fn on_pan(&mut self, delta: Point) {
        self.viewport.pan(&self.source, -delta.x, -delta.y);
        self.needs_redraw = true;
    }

    /// Zooms one level about `anchor` (view pixels), or about the view
    /// centre. Returns false when already at the end of the level range.
    pub fn on_zoom_request(&mut self, direction: ZoomDirection, anchor: Option<Point>) -> bool {
        let level = self.viewport.level;
        let target = match direction {
            ZoomDirection::In => level.checked_add(1),
            ZoomDirection::Out => level.checked_sub(1),
        };
        let Some(target) = target else {
            return false;
        };

        let changed = match anchor {
            Some(anchor) => self.viewport.zoom_about(&mut self.source, target, anchor),
            None => self.viewport.zoom_to(&mut self.source, target),
        };
        if changed {
            self.level_changed();
        }
        changed
    }

    /// Switches to `level` keeping the view centre in place
    pub fn zoom_to_level(&mut self, level: u8) -> bool {
        let changed = self.viewport.zoom_to(&mut self.source, level);
        if changed {
            self.level_changed();
        }
        changed
    }

    /// Centres the view on `position` at the current level
    pub fn goto_position(&mut self, position: LatLng) {
        self.viewport.goto_position(&self.source, position);
        self.needs_redraw = true;
    }

    pub fn goto_level_and_position(&mut self, level: u8, position: LatLng) -> bool {
        let changed = self
            .viewport
            .goto_level_and_position(&mut self.source, level, position);
        if changed {
            self.level_changed();
        }
        changed
    }

    /// Centres on `position` at the lowest level where an area of `size`
    /// (world units wide and high) fills at least half the view
    pub fn zoom_to_area(&mut self, position: LatLng, size: (f64, f64)) -> bool {
        let level = self.viewport.level_for_area(&mut self.source, size);
        log::debug!("area {:?} at {:?} fits level {}", size, position, level);
        self.goto_level_and_position(level, position)
    }

    fn level_changed(&mut self) {
        self.needs_redraw = true;
        let level = self.viewport.level;
        log::debug!("level changed to {}", level);
        if self.config.level_change_events {
            self.emit(MapEvent::LevelChange { level });
        }
    }

    // Selection

    /// A click without drag at `view`. Every visible, selectable layer gets
    /// one select event, top of the Z-order last.
    pub fn on_click(&mut self, view: Point, button: MouseButton, modifiers: KeyModifiers) {
        let right = match button {
            MouseButton::Left => false,
            MouseButton::Right => true,
            _ => return,
        };
        log::trace!("click at ({}, {}) {:?} {:?}", view.x, view.y, button, modifiers);

        let map_position = self.viewport.view_to_geo(&self.source, view);
        for id in self.registry.z_order_snapshot() {
            // listeners may have deleted it
            let Some(layer) = self.registry.get(id) else {
                continue;
            };
            if !layer.is_hit_testable() {
                continue;
            }

            let selection = point_select(layer, &self.viewport, &self.source, view);
            log::trace!("layer {} point select: {:?}", id, selection.as_ref().map(|s| s.entity_index));
            let record = PointSelect {
                layer_id: id,
                selection,
                map_position,
                view_position: view,
            };
            let event = if right {
                MapEvent::RightPointSelect(record)
            } else {
                MapEvent::PointSelect(record)
            };
            self.emit(event);
        }
    }

    /// A drag box between two view positions, in either order
    pub fn on_drag_box(
        &mut self,
        corner_a: Point,
        corner_b: Point,
        button: MouseButton,
        modifiers: KeyModifiers,
    ) {
        let right = match button {
            MouseButton::Left => false,
            MouseButton::Right => true,
            _ => return,
        };
        log::trace!("box select {:?} {:?} {:?}", corner_a, corner_b, modifiers);
        self.needs_redraw = true;

        for id in self.registry.z_order_snapshot() {
            let Some(layer) = self.registry.get(id) else {
                continue;
            };
            if !layer.is_hit_testable() {
                continue;
            }

            let selections = box_select(layer, &self.viewport, &self.source, corner_a, corner_b);
            log::trace!("layer {} box select: {} hits", id, selections.len());
            let record = BoxSelect {
                layer_id: id,
                selections,
            };
            let event = if right {
                MapEvent::RightBoxSelect(record)
            } else {
                MapEvent::BoxSelect(record)
            };
            self.emit(event);
        }
    }

    /// Reports the world position under the pointer, or `None` over the
    /// margin around a small map
    pub fn on_pointer_move(&mut self, view: Point) {
        if !self.config.position_events {
            return;
        }
        let position = self
            .viewport
            .position_is_on_map(view)
            .then(|| self.viewport.view_to_geo(&self.source, view));
        self.emit(MapEvent::PositionChange { position });
    }

    pub fn on_pointer_leave(&mut self) {
        self.handler.cancel();
        if self.config.position_events {
            self.emit(MapEvent::PositionChange { position: None });
        }
    }

    /// Feeds raw input through the input handler and carries out the result
    pub fn handle_input(&mut self, event: InputEvent) {
        for action in self.handler.handle_event(event) {
            match action {
                Action::Pan { delta } => self.on_pan(delta),
                Action::Zoom { direction, anchor } => {
                    self.on_zoom_request(direction, anchor);
                }
                Action::PointSelect {
                    position,
                    button,
                    modifiers,
                } => self.on_click(position, button, modifiers),
                Action::BoxSelect {
                    start,
                    end,
                    button,
                    modifiers,
                } => self.on_drag_box(start, end, button, modifiers),
                Action::SelectionBox { .. } => self.needs_redraw = true,
                Action::PointerMoved { position } => self.on_pointer_move(position),
                Action::PointerLeft => self.on_pointer_leave(),
                Action::Resize { width, height } => self.on_resize(width, height),
            }
        }
    }

    // Events

    /// Registers a synchronous listener for one kind of event
    pub fn on<F>(&mut self, kind: EventKind, listener: F)
    where
        F: FnMut(&MapEvent, &mut LayerRegistry) + 'static,
    {
        self.events.on(kind, listener);
    }

    /// Drains emitted events, oldest first
    pub fn take_events(&mut self) -> Vec<MapEvent> {
        self.events.take_events()
    }

    /// Number of events waiting in the queue
    pub fn pending_events(&self) -> usize {
        self.events.pending_events()
    }

    /// Emits `event`; a listener running requests a redraw
    fn emit(&mut self, event: MapEvent) {
        if self.events.emit(event, &mut self.registry) {
            self.needs_redraw = true;
        }
    }

    pub fn set_level_change_events(&mut self, enabled: bool) {
        self.config.level_change_events = enabled;
    }

    pub fn set_position_events(&mut self, enabled: bool) {
        self.config.position_events = enabled;
    }

    // Layers

    /// Registers a layer on top of the Z-order
    pub fn add_layer(&mut self, entities: LayerEntities, options: LayerOptions) -> Result<LayerId> {
        let id = self.registry.add(entities, options)?;
        if self.registry.get(id).map_or(false, |layer| layer.visible) {
            self.needs_redraw = true;
        }
        Ok(id)
    }

    pub fn add_point_layer(
        &mut self,
        points: Vec<PointEntity>,
        options: LayerOptions,
    ) -> Result<LayerId> {
        self.add_layer(LayerEntities::Point(points), options)
    }

    pub fn add_image_layer(
        &mut self,
        images: Vec<ImageEntity>,
        options: LayerOptions,
    ) -> Result<LayerId> {
        self.add_layer(LayerEntities::Image(images), options)
    }

    pub fn add_polygon_layer(
        &mut self,
        polygons: Vec<PolygonEntity>,
        options: LayerOptions,
    ) -> Result<LayerId> {
        self.add_layer(LayerEntities::Polygon(polygons), options)
    }

    pub fn add_text_layer(
        &mut self,
        texts: Vec<TextEntity>,
        options: LayerOptions,
    ) -> Result<LayerId> {
        self.add_layer(LayerEntities::Text(texts), options)
    }

    /// Builds a layer from JSON tuples; see [`entities_from_json`]
    pub fn add_layer_from_json(
        &mut self,
        kind: LayerKind,
        data: &serde_json::Value,
        options: LayerOptions,
        attributes: Option<&serde_json::Value>,
    ) -> Result<LayerId> {
        let entities = entities_from_json(kind, data, attributes, options.frame)?;
        self.add_layer(entities, options)
    }

    pub fn delete_layer(&mut self, id: LayerId) {
        if let Some(layer) = self.registry.remove(id) {
            self.needs_redraw |= layer.visible;
        }
    }

    pub fn show_layer(&mut self, id: LayerId) {
        self.needs_redraw |= self.registry.set_visible(id, true);
    }

    pub fn hide_layer(&mut self, id: LayerId) {
        self.needs_redraw |= self.registry.set_visible(id, false);
    }

    pub fn set_layer_selectable(&mut self, id: LayerId, selectable: bool) {
        self.needs_redraw |= self.registry.set_selectable(id, selectable);
    }

    /// `None` shows the layer at every allowed level
    pub fn set_layer_show_levels(&mut self, id: LayerId, levels: Option<BTreeSet<u8>>) {
        self.needs_redraw |= self.registry.set_show_levels(id, levels);
    }

    pub fn set_layer_selection_delta(&mut self, id: LayerId, delta: f64) {
        self.needs_redraw |= self.registry.set_selection_delta(id, delta);
    }

    pub fn push_layer_to_back(&mut self, id: LayerId) {
        self.needs_redraw |= self.registry.push_to_back(id);
    }

    pub fn pop_layer_to_front(&mut self, id: LayerId) {
        self.needs_redraw |= self.registry.pop_to_front(id);
    }

    /// Moves `id` directly below `reference`
    pub fn place_layer_below(&mut self, id: LayerId, reference: LayerId) {
        self.needs_redraw |= self.registry.place_below(id, reference);
    }

    // Drawing

    /// Turns pending tile notifications into a redraw request.
    ///
    /// Returns true if any notification arrived since the last call.
    pub fn poll_tile_updates(&mut self) -> bool {
        let mut updated = false;
        for (level, x, y) in self.tile_updates.try_iter() {
            log::trace!("tile ({}, {}) at level {} available", x, y, level);
            updated = true;
        }
        self.needs_redraw |= updated;
        updated
    }

    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    /// Returns and clears the redraw request
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }

    /// Describes one frame: tiles, then layers back to front, then the
    /// selection box being dragged out
    pub fn render(&mut self, context: &mut RenderContext<S::Tile>, measurer: &dyn TextMeasurer) {
        context.begin_frame();

        let layout = self.viewport.tile_layout();
        for (x, y, origin) in layout.tiles() {
            if let Some(tile) = self.source.tile(x, y) {
                context.push(DrawCommand::Tile { tile, origin });
            }
        }

        let painter = Painter {
            viewport: &self.viewport,
            source: &self.source,
            measurer,
        };
        let level = self.viewport.level;
        for layer in self.registry.layers() {
            if layer.visible && layer.shows_at(level) {
                painter.draw_layer(layer, context);
            }
        }

        if let Some(bounds) = self.handler.selection_box() {
            context.push(DrawCommand::SelectionBox { bounds });
        }

        log::trace!("frame {}: {} commands", context.frame(), context.commands().len());
        self.needs_redraw = false;
    }

    // Accessors

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutable access to the tile source. Switching its level behind the
    /// map's back leaves the viewport stale.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn registry(&self) -> &LayerRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut LayerRegistry {
        &mut self.registry
    }

    pub fn input_handler_mut(&mut self) -> &mut InputHandler {
        &mut self.handler
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn level(&self) -> u8 {
        self.viewport.level
    }
}

/// Turns layer entities into draw commands for the current view
struct Painter<'a, S: TileSource + ?Sized> {
    viewport: &'a Viewport,
    source: &'a S,
    measurer: &'a dyn TextMeasurer,
}

impl<'a, S: TileSource + ?Sized> Painter<'a, S> {
    fn view_size(&self) -> (f64, f64) {
        (
            self.viewport.view_width as f64,
            self.viewport.view_height as f64,
        )
    }

    /// Placement input for a hotspot, or `None` when a map-frame hotspot is
    /// out of view
    fn input(&self, frame: ReferenceFrame, position: Point, offset: Point) -> Option<PlacementInput> {
        let input = match frame {
            ReferenceFrame::Map => {
                let view = self
                    .viewport
                    .geo_to_view_masked(self.source, hotspot_geo(position))?;
                PlacementInput::at(view)
            }
            ReferenceFrame::View => {
                let (view_w, view_h) = self.view_size();
                PlacementInput::at(position).with_view(view_w, view_h)
            }
        };
        Some(input.with_offset(offset))
    }

    fn draw_layer(&self, layer: &Layer, context: &mut RenderContext<S::Tile>) {
        let frame = layer.frame;
        match &layer.entities {
            LayerEntities::Point(points) => {
                for point in points.iter().filter(|p| p.radius > 0.0) {
                    let Some(input) = self.input(frame, point.position, point.offset) else {
                        continue;
                    };
                    context.push(DrawCommand::Circle {
                        center: resolve(PrimitiveFamily::Point, frame, point.placement, input),
                        radius: point.radius,
                        colour: point.colour,
                    });
                }
            }
            LayerEntities::Image(images) => {
                for image in images {
                    let Some(input) = self.input(frame, image.position, image.offset) else {
                        continue;
                    };
                    let input = input.with_size(image.width, image.height);
                    context.push(DrawCommand::Bitmap {
                        image: image.image,
                        origin: resolve(PrimitiveFamily::Image, frame, image.placement, input),
                    });
                }
            }
            LayerEntities::Polygon(polygons) => {
                for polygon in polygons {
                    self.draw_polygon(frame, polygon, context);
                }
            }
            LayerEntities::Text(texts) => {
                for text in texts {
                    self.draw_text(frame, text, context);
                }
            }
        }
    }

    fn draw_polygon(
        &self,
        frame: ReferenceFrame,
        polygon: &PolygonEntity,
        context: &mut RenderContext<S::Tile>,
    ) {
        let (view_w, view_h) = self.view_size();
        let mut points: Vec<Point> = polygon
            .vertices()
            .map(|vertex| {
                let vertex = match frame {
                    ReferenceFrame::Map => self.viewport.geo_to_view(self.source, hotspot_geo(vertex)),
                    ReferenceFrame::View => vertex,
                };
                let input = PlacementInput::at(vertex)
                    .with_offset(polygon.offset)
                    .with_view(view_w, view_h);
                resolve(PrimitiveFamily::Polygon, frame, polygon.placement, input)
            })
            .collect();
        let Some(first) = points.first().copied() else {
            return;
        };

        if polygon.is_closed() {
            points.push(first);
            context.push(DrawCommand::Polygon {
                points,
                width: polygon.width,
                colour: polygon.colour,
                fill: polygon.filled.then_some(polygon.fill_colour),
            });
        } else {
            context.push(DrawCommand::Polyline {
                points,
                width: polygon.width,
                colour: polygon.colour,
            });
        }
    }

    fn draw_text(&self, frame: ReferenceFrame, text: &TextEntity, context: &mut RenderContext<S::Tile>) {
        let Some(input) = self.input(frame, text.position, text.offset) else {
            return;
        };

        if text.radius > 0.0 {
            // the dot sits on the hotspot, clear of the text's offset
            let center = match frame {
                ReferenceFrame::Map => Point::new(input.x, input.y),
                ReferenceFrame::View => {
                    resolve(PrimitiveFamily::Text, frame, text.placement, input)
                }
            };
            context.push(DrawCommand::Circle {
                center,
                radius: text.radius,
                colour: text.colour,
            });
        }

        let (width, height) = self.measurer.measure(&text.text, &text.font);
        let input = input.with_size(width, height);
        context.push(DrawCommand::Text {
            text: text.text.clone(),
            origin: resolve(PrimitiveFamily::Text, frame, text.placement, input),
            colour: text.text_colour,
            font: text.font.clone(),
        });
    }
}
