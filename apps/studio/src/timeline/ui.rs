use eframe::egui::{self, Align2, Color32, FontId, Rect, Sense, Stroke};

use animation::{clamp_position, Channel, EditCommand, PropertyKind, Value};

use crate::app::App;

const ROW_H: f32 = 22.0;
const RULER_H: f32 = 26.0;
const GUTTER_W: f32 = 210.0;

/// A keyframe marker mid-drag: the track still holds `from`; `preview` is
/// where the marker is drawn until release commits the move.
#[derive(Debug, Clone)]
pub(crate) struct KeyDrag {
    pub(crate) object: String,
    pub(crate) property: String,
    pub(crate) channel: Channel,
    pub(crate) from: u32,
    pub(crate) preview: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SelectedKey {
    pub(crate) object: String,
    pub(crate) property: String,
    pub(crate) channel: Channel,
    pub(crate) position: u32,
}

enum Row {
    Object { name: String },
    Channel(ChannelRow),
}

struct ChannelRow {
    object: String,
    property: String,
    channel: Channel,
    label: String,
    keys: Vec<u32>,
    display: String,
    swatch: Option<Color32>,
    marker_color: Color32,
    stamp_value: String,
    keyed_at_playhead: bool,
}

fn channel_color(channel: Channel) -> Color32 {
    match channel {
        Channel::X | Channel::R => Color32::from_rgb(228, 86, 86),
        Channel::Y | Channel::G => Color32::from_rgb(108, 196, 108),
        Channel::Z | Channel::B => Color32::from_rgb(96, 142, 230),
        Channel::Value => Color32::from_rgb(208, 208, 130),
    }
}

fn format_value(value: Value) -> String {
    match value {
        Value::Number(v) => format!("{v:.2}"),
        Value::Color(c) => c.to_hex(),
    }
}

impl App {
    fn collect_rows(&self) -> Vec<Row> {
        let percent = self.session.transport.progress().as_percent();
        let playhead_pos = clamp_position(percent);
        let mut rows = Vec::new();
        for (object, properties) in self.session.state.iter() {
            rows.push(Row::Object { name: object.to_string() });
            for (property, tracks) in properties {
                for (channel, track) in tracks.channels() {
                    let label = if channel == Channel::Value {
                        property.clone()
                    } else {
                        format!("{property}.{channel}")
                    };
                    let (display, swatch, stamp_value) = if track.is_empty() {
                        // an empty hex color channel must be seeded with a
                        // color literal, never a number
                        let stamp = match (tracks.kind(), channel) {
                            (PropertyKind::Color, Channel::Value) => "#ffffff".to_string(),
                            _ => "0".to_string(),
                        };
                        ("-".to_string(), None, stamp)
                    } else {
                        let value = track.value_at(percent);
                        let swatch = value
                            .as_color()
                            .map(|c| Color32::from_rgb(c.r, c.g, c.b));
                        (format_value(value), swatch, value.to_string())
                    };
                    let keys: Vec<u32> = track.keys().iter().map(|k| k.position).collect();
                    let keyed_at_playhead = keys
                        .iter()
                        .any(|&k| k.abs_diff(playhead_pos) <= 1);
                    rows.push(Row::Channel(ChannelRow {
                        object: object.to_string(),
                        property: property.clone(),
                        channel,
                        label,
                        keys,
                        display,
                        swatch,
                        marker_color: channel_color(channel),
                        stamp_value,
                        keyed_at_playhead,
                    }));
                }
            }
        }
        rows
    }

    pub(crate) fn timeline_ui(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("Add Property").clicked() {
                self.add_property.open = true;
            }
            if ui.button("Add Keyframe").clicked() {
                self.add_keyframe.open = true;
            }
            if !self.status.is_empty() {
                ui.colored_label(Color32::from_rgb(235, 165, 70), &self.status);
            }
        });

        let rows = self.collect_rows();
        let mut pending: Vec<EditCommand> = Vec::new();

        egui::ScrollArea::vertical()
            .id_salt("timeline_rows")
            .show(ui, |ui| {
                let width = ui.available_width().max(420.0);
                let height = (RULER_H + rows.len() as f32 * ROW_H).max(140.0);
                let (rect, _bg) =
                    ui.allocate_exact_size(egui::vec2(width, height), Sense::hover());
                let painter = ui.painter_at(rect);
                painter.rect_filled(rect, 0.0, Color32::from_rgb(18, 18, 20));

                let lane_left = rect.left() + GUTTER_W;
                let lane_w = (rect.right() - lane_left - 8.0).max(1.0);
                let pos_to_x = |position: f32| lane_left + (position / 100.0) * lane_w;

                // ruler: a tick every 5%, labelled every 20%
                for i in 0..=20 {
                    let x = pos_to_x(i as f32 * 5.0);
                    let major = i % 4 == 0;
                    let top = rect.top() + if major { 6.0 } else { 14.0 };
                    painter.line_segment(
                        [egui::pos2(x, top), egui::pos2(x, rect.top() + RULER_H - 4.0)],
                        Stroke::new(1.0, Color32::from_gray(if major { 120 } else { 60 })),
                    );
                    if major {
                        painter.text(
                            egui::pos2(x + 3.0, rect.top() + 2.0),
                            Align2::LEFT_TOP,
                            format!("{}%", i * 5),
                            FontId::monospace(10.0),
                            Color32::from_gray(150),
                        );
                    }
                }

                if rows.is_empty() {
                    painter.text(
                        rect.center(),
                        Align2::CENTER_CENTER,
                        "No animated properties. Add one to start authoring.",
                        FontId::monospace(12.0),
                        Color32::from_gray(120),
                    );
                }

                for (i, row) in rows.iter().enumerate() {
                    let y = rect.top() + RULER_H + i as f32 * ROW_H;
                    let row_rect = Rect::from_min_size(
                        egui::pos2(rect.left(), y),
                        egui::vec2(rect.width(), ROW_H),
                    );
                    painter.line_segment(
                        [row_rect.left_top(), row_rect.right_top()],
                        Stroke::new(1.0, Color32::from_gray(38)),
                    );
                    match row {
                        Row::Object { name } => {
                            painter.rect_filled(row_rect, 0.0, Color32::from_gray(30));
                            painter.text(
                                egui::pos2(rect.left() + 6.0, row_rect.center().y),
                                Align2::LEFT_CENTER,
                                name,
                                FontId::monospace(12.0),
                                Color32::WHITE,
                            );
                        }
                        Row::Channel(channel_row) => {
                            self.channel_row_ui(
                                ui,
                                &painter,
                                row_rect,
                                lane_left,
                                lane_w,
                                i,
                                channel_row,
                                &mut pending,
                            );
                        }
                    }
                }

                // playhead spans the ruler and every row
                let progress = self.session.transport.progress();
                let phx = pos_to_x(progress.as_percent() as f32);
                painter.line_segment(
                    [egui::pos2(phx, rect.top()), egui::pos2(phx, rect.bottom())],
                    Stroke::new(2.0, Color32::from_rgb(220, 60, 60)),
                );
                painter.rect_filled(
                    Rect::from_center_size(egui::pos2(phx, rect.top() + 4.0), egui::vec2(8.0, 8.0)),
                    2.0,
                    Color32::from_rgb(220, 60, 60),
                );

                // scrub on the ruler: drag owns the progress value until release
                let ruler_rect = Rect::from_min_size(
                    egui::pos2(lane_left, rect.top()),
                    egui::vec2(lane_w, RULER_H),
                );
                let ruler_resp =
                    ui.interact(ruler_rect, egui::Id::new("playhead_ruler"), Sense::click_and_drag());
                let pointer_fraction = |pos: egui::Pos2| {
                    (((pos.x - lane_left) / lane_w).clamp(0.0, 1.0)) as f64
                };
                if ruler_resp.drag_started() {
                    self.session.transport.begin_drag();
                }
                if ruler_resp.dragged() {
                    if let Some(pos) = ruler_resp.interact_pointer_pos() {
                        let pushed = self.session.drag_playhead(pointer_fraction(pos));
                        self.pending_scroll = Some(pushed.fraction());
                    }
                }
                if ruler_resp.drag_stopped() {
                    self.session.end_drag();
                }
                if ruler_resp.clicked() {
                    if let Some(pos) = ruler_resp.interact_pointer_pos() {
                        let pushed = self.session.drag_playhead(pointer_fraction(pos));
                        self.session.end_drag();
                        self.pending_scroll = Some(pushed.fraction());
                    }
                }

                // keyframe drags are driven globally so a release anywhere
                // commits the move
                if self.key_drag.is_some() {
                    if ui.input(|i| i.pointer.primary_down()) {
                        if let Some(pos) = ui.input(|i| i.pointer.interact_pos()) {
                            let percent = ((pos.x - lane_left) / lane_w * 100.0).round();
                            if let Some(drag) = &mut self.key_drag {
                                drag.preview = clamp_position(percent as f64);
                            }
                        }
                    } else if let Some(drag) = self.key_drag.take() {
                        if drag.preview != drag.from {
                            pending.push(EditCommand::MoveKeyframe {
                                object: drag.object,
                                property: drag.property,
                                channel: drag.channel,
                                from: drag.from,
                                to: drag.preview as f64,
                            });
                        }
                    }
                }
            });

        // delete hotkey on the selected keyframe
        let pressed_delete = ui.input(|i| {
            i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace)
        });
        if pressed_delete {
            if let Some(selected) = self.selected_key.take() {
                pending.push(EditCommand::RemoveKeyframe {
                    object: selected.object,
                    property: selected.property,
                    channel: selected.channel,
                    position: selected.position,
                });
            }
        }

        for command in pending {
            match self.session.edit(command) {
                Ok(_) => self.status.clear(),
                Err(err) => {
                    tracing::warn!(error = %err, "edit rejected");
                    self.status = err.to_string();
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn channel_row_ui(
        &mut self,
        ui: &mut egui::Ui,
        painter: &egui::Painter,
        row_rect: Rect,
        lane_left: f32,
        lane_w: f32,
        row_index: usize,
        row: &ChannelRow,
        pending: &mut Vec<EditCommand>,
    ) {
        let center_y = row_rect.center().y;
        painter.text(
            egui::pos2(row_rect.left() + 18.0, center_y),
            Align2::LEFT_CENTER,
            &row.label,
            FontId::monospace(12.0),
            Color32::from_gray(200),
        );
        if let Some(swatch) = row.swatch {
            painter.rect_filled(
                Rect::from_center_size(egui::pos2(lane_left - 72.0, center_y), egui::vec2(10.0, 10.0)),
                2.0,
                swatch,
            );
        }
        painter.text(
            egui::pos2(lane_left - 10.0, center_y),
            Align2::RIGHT_CENTER,
            &row.display,
            FontId::monospace(11.0),
            Color32::from_gray(170),
        );

        // stamp toggle: records the current interpolated value at the playhead
        let stamp_rect =
            Rect::from_center_size(egui::pos2(lane_left - 94.0, center_y), egui::vec2(12.0, 12.0));
        let stamp_resp = ui.interact(
            stamp_rect,
            egui::Id::new(("stamp", row_index)),
            Sense::click(),
        );
        if row.keyed_at_playhead {
            painter.circle_filled(stamp_rect.center(), 4.0, row.marker_color);
        } else {
            painter.circle_stroke(stamp_rect.center(), 4.0, Stroke::new(1.0, Color32::from_gray(110)));
        }
        if stamp_resp.clicked() {
            let percent = self.session.transport.progress().as_percent();
            pending.push(EditCommand::AddKeyframe {
                object: row.object.clone(),
                property: row.property.clone(),
                channel: row.channel,
                position: clamp_position(percent) as f64,
                value: row.stamp_value.clone(),
            });
        }

        for &position in &row.keys {
            let dragged_here = self.key_drag.as_ref().is_some_and(|drag| {
                drag.object == row.object
                    && drag.property == row.property
                    && drag.channel == row.channel
                    && drag.from == position
            });
            let drawn_pos = if dragged_here {
                self.key_drag.as_ref().map(|d| d.preview).unwrap_or(position)
            } else {
                position
            };
            let x = lane_left + (drawn_pos as f32 / 100.0) * lane_w;
            let center = egui::pos2(x, center_y);
            let marker_rect = Rect::from_center_size(center, egui::vec2(12.0, 12.0));
            let resp = ui.interact(
                marker_rect,
                egui::Id::new(("keyframe", row_index, position)),
                Sense::click_and_drag(),
            );

            let selected = self.selected_key.as_ref().is_some_and(|sel| {
                sel.object == row.object
                    && sel.property == row.property
                    && sel.channel == row.channel
                    && sel.position == position
            });
            if selected || dragged_here {
                painter.circle_stroke(center, 6.0, Stroke::new(1.5, Color32::WHITE));
            }
            painter.circle_filled(center, 4.0, row.marker_color);

            if resp.clicked() {
                self.selected_key = Some(SelectedKey {
                    object: row.object.clone(),
                    property: row.property.clone(),
                    channel: row.channel,
                    position,
                });
            }
            if resp.drag_started() {
                self.selected_key = Some(SelectedKey {
                    object: row.object.clone(),
                    property: row.property.clone(),
                    channel: row.channel,
                    position,
                });
                self.key_drag = Some(KeyDrag {
                    object: row.object.clone(),
                    property: row.property.clone(),
                    channel: row.channel,
                    from: position,
                    preview: position,
                });
            }
        }
    }
}
