//! Resolver Input Widget
//!
//! Text field plus a floating candidate list for picking an entity.
//! The list is an `egui::Area` in the foreground order, so it is never clipped
//! by the panel or scroll area the field lives in.
//!
//! Outside clicks: a press that lands inside the overlay flags the input
//! before the field's focus loss is reported, so the overlay survives until
//! the row click arrives.

use egui::{Color32, Id, Key, Pos2, RichText, ScrollArea, TextEdit, Ui};
use oj_resolver::{OverlayGeometry, Rect, RectAnchor, ResolverEvent, ResolverInput};
use oj_types::Entity;
use std::hash::Hash;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

/// Poll interval while a fetch or debounce is outstanding
const PENDING_REPAINT_INTERVAL: Duration = Duration::from_millis(50);

/// Height cap of the candidate list
const CANDIDATE_LIST_MAX_HEIGHT: f32 = 240.0;

/// Resolver input bound to an egui text field
pub struct ResolverInputWidget {
    input: ResolverInput,
    anchor: Rc<RectAnchor>,
    id: Id,
    /// Screen rect of the overlay as drawn last frame
    overlay_rect: Option<egui::Rect>,
}

/// Result of rendering the widget for one frame
pub struct ResolverInputResponse {
    /// Response of the text field
    pub response: egui::Response,
    /// Notifications produced this frame
    pub events: Vec<ResolverEvent>,
}

/// What the user did inside the overlay
enum OverlayAction {
    SelectCategory(Option<String>),
    SelectEntity(Entity),
}

impl ResolverInputWidget {
    pub fn new(ctx: &egui::Context, id_source: impl Hash, mut input: ResolverInput) -> Self {
        let repaint_ctx = ctx.clone();
        input.set_repaint_hook(Arc::new(move || repaint_ctx.request_repaint()));

        Self {
            input,
            anchor: Rc::new(RectAnchor::default()),
            id: Id::new(id_source),
            overlay_rect: None,
        }
    }

    pub fn input(&self) -> &ResolverInput {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut ResolverInput {
        &mut self.input
    }

    /// Anchor tracking the text field's rect
    pub fn anchor(&self) -> Rc<RectAnchor> {
        self.anchor.clone()
    }

    pub fn overlay_rect(&self) -> Option<egui::Rect> {
        self.overlay_rect
    }

    /// Render the field (and the overlay while open)
    pub fn ui(&mut self, ui: &mut Ui) -> ResolverInputResponse {
        let mut events = Vec::new();

        self.input.process_async_results();
        self.input.tick(instant::Instant::now());
        if self.input.is_loading() {
            ui.ctx().request_repaint_after(PENDING_REPAINT_INTERVAL);
        }

        // Text field
        let mut buffer = self.input.query_text().to_string();
        let mut edit = TextEdit::singleline(&mut buffer)
            .id(self.id.with("text"))
            .desired_width(ui.available_width());
        if let Some(placeholder) = self.input.placeholder() {
            edit = edit.hint_text(placeholder);
        }
        let response = ui.add_enabled(!self.input.is_disabled(), edit);
        self.anchor.set(to_anchor_rect(response.rect));

        if response.changed() {
            events.extend(self.input.set_query(buffer));
            if response.has_focus() && !self.input.is_open() {
                self.input.focus(self.anchor.clone());
            }
        }
        if response.gained_focus() {
            self.input.focus(self.anchor.clone());
        }

        self.handle_keys(ui, &response, &mut events);
        self.handle_focus_loss(ui, &response);

        // Overlay
        if self.input.is_open() {
            self.input.positioner().refresh();
            if let Some(action) = self.show_overlay(ui.ctx()) {
                match action {
                    OverlayAction::SelectEntity(entity) => {
                        tracing::debug!(id = %entity.id, "candidate picked from overlay");
                        events.extend(self.input.select_entity(entity));
                        response.surrender_focus();
                    }
                    OverlayAction::SelectCategory(category) => {
                        self.input.set_category(category.as_deref());
                        response.request_focus();
                    }
                }
            }
        }
        if !self.input.is_open() {
            self.overlay_rect = None;
        }

        ResolverInputResponse { response, events }
    }

    fn handle_keys(&mut self, ui: &Ui, response: &egui::Response, events: &mut Vec<ResolverEvent>) {
        if !self.input.is_open() {
            return;
        }
        let (up, down, enter, escape) = ui.input(|i| {
            (
                i.key_pressed(Key::ArrowUp),
                i.key_pressed(Key::ArrowDown),
                i.key_pressed(Key::Enter),
                i.key_pressed(Key::Escape),
            )
        });

        if response.has_focus() {
            if down {
                self.input.highlight_next();
            }
            if up {
                self.input.highlight_prev();
            }
        }
        // Single-line edits give up focus on Enter/Escape, so check after the fact
        if enter && (response.has_focus() || response.lost_focus()) {
            events.extend(self.input.select_highlighted());
        }
        if escape {
            self.input.close();
        }
    }

    fn handle_focus_loss(&mut self, ui: &Ui, response: &egui::Response) {
        if !self.input.is_open() {
            return;
        }
        let press = ui.input(|i| {
            if i.pointer.any_pressed() {
                i.pointer.press_origin()
            } else {
                None
            }
        });
        let pressed_in_overlay = press.is_some_and(|pos| self.contains_overlay(pos));

        if response.lost_focus() {
            if pressed_in_overlay {
                self.input.mark_pointer_in_overlay();
            }
            self.input.blur();
        } else if let Some(pos) = press {
            // Field was already unfocused (e.g. after a category click)
            if !pressed_in_overlay && !response.rect.contains(pos) {
                self.input.blur();
            }
        }
    }

    fn contains_overlay(&self, pos: Pos2) -> bool {
        self.overlay_rect.is_some_and(|rect| rect.contains(pos))
    }

    fn show_overlay(&mut self, ctx: &egui::Context) -> Option<OverlayAction> {
        let geometry: OverlayGeometry = self.input.geometry();
        let input = &self.input;

        let area = egui::Area::new(self.id.with("overlay"))
            .order(egui::Order::Foreground)
            .fixed_pos(Pos2::new(geometry.left as f32, geometry.top as f32))
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style())
                    .show(ui, |ui| {
                        ui.set_min_width(geometry.min_width as f32);
                        overlay_contents(ui, input)
                    })
                    .inner
            });

        self.overlay_rect = Some(area.response.rect);
        area.inner
    }
}

/// Category row followed by the candidate list
fn overlay_contents(ui: &mut Ui, input: &ResolverInput) -> Option<OverlayAction> {
    let mut action = None;

    let options = input.filter().selector_options();
    if !options.is_empty() {
        ui.horizontal(|ui| {
            for option in options {
                let active = input.active_category() == option.as_deref();
                let label = option.as_deref().unwrap_or("all");
                if ui.selectable_label(active, label).clicked() {
                    action = Some(OverlayAction::SelectCategory(option.clone()));
                }
            }
        });
        ui.separator();
    }

    if input.candidates().is_empty() {
        if input.is_loading() {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Searching...");
            });
        } else {
            ui.label(RichText::new("No results found").color(Color32::GRAY).italics());
        }
        return action;
    }

    let show_category = !input.filter().is_category_fixed();
    ScrollArea::vertical()
        .max_height(CANDIDATE_LIST_MAX_HEIGHT)
        .show(ui, |ui| {
            for (idx, entity) in input.candidates().iter().enumerate() {
                let selected = input.is_selected(entity);
                let highlighted = input.highlighted() == Some(idx);

                ui.horizontal(|ui| {
                    let mut text = RichText::new(entity.display_label());
                    if selected {
                        text = text.strong();
                    }
                    if ui.selectable_label(selected || highlighted, text).clicked() {
                        action = Some(OverlayAction::SelectEntity(entity.clone()));
                    }
                    if show_category {
                        if let Some(category) = &entity.category {
                            ui.label(RichText::new(category).size(10.0).color(Color32::GRAY));
                        }
                    }
                });
            }
        });

    action
}

fn to_anchor_rect(rect: egui::Rect) -> Rect {
    Rect::new(
        rect.left() as f64,
        rect.top() as f64,
        rect.width() as f64,
        rect.height() as f64,
    )
}
