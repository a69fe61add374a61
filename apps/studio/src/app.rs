use eframe::egui;

use animation::{sequence_names, Channel, EditCommand, PropertyKind};
use playback::SessionEvent;

use crate::session::ShowcaseSession;
use crate::timeline::ui::{KeyDrag, SelectedKey};

const PROPERTY_CHOICES: [&str; 5] = ["position", "rotation", "scale", "color", "intensity"];

fn channel_choices(property: &str) -> &'static [Channel] {
    match PropertyKind::for_property(property) {
        PropertyKind::Vector3 => &[Channel::X, Channel::Y, Channel::Z],
        PropertyKind::Scalar | PropertyKind::Color => &[Channel::Value],
    }
}

pub(crate) struct AddPropertyUi {
    pub(crate) open: bool,
    object: String,
    property_idx: usize,
}

impl Default for AddPropertyUi {
    fn default() -> Self {
        Self { open: false, object: "model".into(), property_idx: 0 }
    }
}

impl AddPropertyUi {
    fn ui(&mut self, ctx: &egui::Context) -> Option<EditCommand> {
        if !self.open {
            return None;
        }
        let mut submitted = None;
        let mut keep_open = true;
        egui::Window::new("Add Property")
            .open(&mut keep_open)
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label("Object");
                    ui.text_edit_singleline(&mut self.object);
                });
                ui.horizontal(|ui| {
                    ui.label("Property");
                    egui::ComboBox::from_id_salt("add_property_kind")
                        .selected_text(PROPERTY_CHOICES[self.property_idx])
                        .show_ui(ui, |ui| {
                            for (i, name) in PROPERTY_CHOICES.iter().enumerate() {
                                ui.selectable_value(&mut self.property_idx, i, *name);
                            }
                        });
                });
                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("Add").clicked() && !self.object.trim().is_empty() {
                        submitted = Some(EditCommand::AddProperty {
                            object: self.object.trim().to_string(),
                            property: PROPERTY_CHOICES[self.property_idx].to_string(),
                        });
                        self.open = false;
                    }
                    if ui.button("Cancel").clicked() {
                        self.open = false;
                    }
                });
            });
        if !keep_open {
            self.open = false;
        }
        submitted
    }
}

pub(crate) struct AddKeyframeUi {
    pub(crate) open: bool,
    object: String,
    property_idx: usize,
    channel_idx: usize,
    position: f64,
    value: String,
}

impl Default for AddKeyframeUi {
    fn default() -> Self {
        Self {
            open: false,
            object: "model".into(),
            property_idx: 0,
            channel_idx: 0,
            position: 0.0,
            value: "0".into(),
        }
    }
}

impl AddKeyframeUi {
    fn ui(&mut self, ctx: &egui::Context) -> Option<EditCommand> {
        if !self.open {
            return None;
        }
        let mut submitted = None;
        let mut keep_open = true;
        egui::Window::new("Add Keyframe")
            .open(&mut keep_open)
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label("Object");
                    ui.text_edit_singleline(&mut self.object);
                });
                ui.horizontal(|ui| {
                    ui.label("Property");
                    egui::ComboBox::from_id_salt("keyframe_property")
                        .selected_text(PROPERTY_CHOICES[self.property_idx])
                        .show_ui(ui, |ui| {
                            for (i, name) in PROPERTY_CHOICES.iter().enumerate() {
                                if ui.selectable_value(&mut self.property_idx, i, *name).changed() {
                                    self.channel_idx = 0;
                                }
                            }
                        });
                });
                let channels = channel_choices(PROPERTY_CHOICES[self.property_idx]);
                self.channel_idx = self.channel_idx.min(channels.len() - 1);
                ui.horizontal(|ui| {
                    ui.label("Channel");
                    egui::ComboBox::from_id_salt("keyframe_channel")
                        .selected_text(channels[self.channel_idx].as_str())
                        .show_ui(ui, |ui| {
                            for (i, channel) in channels.iter().enumerate() {
                                ui.selectable_value(&mut self.channel_idx, i, channel.as_str());
                            }
                        });
                });
                ui.horizontal(|ui| {
                    ui.label("Position (%)");
                    ui.add(egui::DragValue::new(&mut self.position).range(0.0..=100.0).speed(1));
                });
                ui.horizontal(|ui| {
                    ui.label("Value");
                    ui.text_edit_singleline(&mut self.value)
                        .on_hover_text("a number, or #rrggbb for color channels");
                });
                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("Add").clicked() && !self.object.trim().is_empty() {
                        submitted = Some(EditCommand::AddKeyframe {
                            object: self.object.trim().to_string(),
                            property: PROPERTY_CHOICES[self.property_idx].to_string(),
                            channel: channels[self.channel_idx],
                            position: self.position,
                            value: self.value.trim().to_string(),
                        });
                        self.open = false;
                    }
                    if ui.button("Cancel").clicked() {
                        self.open = false;
                    }
                });
            });
        if !keep_open {
            self.open = false;
        }
        submitted
    }
}

pub(crate) struct App {
    pub(crate) session: ShowcaseSession,
    pub(crate) key_drag: Option<KeyDrag>,
    pub(crate) selected_key: Option<SelectedKey>,
    pub(crate) add_property: AddPropertyUi,
    pub(crate) add_keyframe: AddKeyframeUi,
    /// Progress fraction to push into the scroll strip next frame, set by
    /// playhead drags and auto-play so scrubbing also moves the scroll
    /// source.
    pub(crate) pending_scroll: Option<f64>,
    pub(crate) status: String,
    strip_max: f32,
}

impl App {
    pub(crate) fn new() -> Self {
        Self {
            session: ShowcaseSession::new(),
            key_drag: None,
            selected_key: None,
            add_property: AddPropertyUi::default(),
            add_keyframe: AddKeyframeUi::default(),
            pending_scroll: None,
            status: String::new(),
            strip_max: 1.0,
        }
    }

    fn top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("Sequence:");
                let mut selected = self.session.sequence_name.clone();
                egui::ComboBox::from_id_salt("sequence_combo")
                    .selected_text(selected.clone())
                    .show_ui(ui, |ui| {
                        for name in sequence_names() {
                            ui.selectable_value(&mut selected, name.to_string(), *name);
                        }
                    });
                if selected != self.session.sequence_name {
                    if let Err(err) = self.session.load_sequence(&selected) {
                        tracing::warn!(error = %err, "sequence load failed");
                        self.status = err.to_string();
                    }
                }
                ui.separator();
                let play_label = if self.session.transport.is_playing() {
                    "Pause (Space)"
                } else {
                    "Play (Space)"
                };
                if ui.button(play_label).clicked() {
                    self.session.transport.toggle_play();
                }
                if ui.button("Rewind").clicked() {
                    let pushed = self.session.drag_playhead(0.0);
                    self.session.end_drag();
                    self.pending_scroll = Some(pushed.fraction());
                }
                if ui.button("Rebind Scene").clicked() {
                    self.session.rebuild_rig();
                }
                ui.separator();
                ui.monospace(format!(
                    "{:>5.1}%  {:?}",
                    self.session.transport.progress().as_percent(),
                    self.session.transport.driver()
                ));
            });
        });
    }

    fn scene_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("scene").default_width(360.0).show(ctx, |ui| {
            ui.heading("Scene");
            let readout: Vec<(String, scene::SceneObject)> = self
                .session
                .bindings
                .iter()
                .filter_map(|(name, id)| {
                    self.session.rig.get(id).map(|object| (name.to_string(), object.clone()))
                })
                .collect();
            egui_extras::TableBuilder::new(ui)
                .striped(true)
                .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                .column(egui_extras::Column::auto())
                .column(egui_extras::Column::auto())
                .column(egui_extras::Column::auto())
                .column(egui_extras::Column::auto())
                .column(egui_extras::Column::remainder())
                .header(20.0, |mut header| {
                    header.col(|ui| {
                        ui.strong("Name");
                    });
                    header.col(|ui| {
                        ui.strong("Position");
                    });
                    header.col(|ui| {
                        ui.strong("Rotation");
                    });
                    header.col(|ui| {
                        ui.strong("Int.");
                    });
                    header.col(|ui| {
                        ui.strong("Color");
                    });
                })
                .body(|mut body| {
                    for (name, object) in &readout {
                        body.row(22.0, |mut row| {
                            row.col(|ui| {
                                ui.monospace(name);
                            });
                            row.col(|ui| {
                                ui.monospace(format!(
                                    "({:.2}, {:.2}, {:.2})",
                                    object.position.x, object.position.y, object.position.z
                                ));
                            });
                            row.col(|ui| {
                                ui.monospace(format!(
                                    "({:.2}, {:.2}, {:.2})",
                                    object.rotation.x, object.rotation.y, object.rotation.z
                                ));
                            });
                            row.col(|ui| {
                                ui.monospace(format!("{:.2}", object.intensity));
                            });
                            row.col(|ui| {
                                let (rect, _) = ui.allocate_exact_size(
                                    egui::vec2(14.0, 14.0),
                                    egui::Sense::hover(),
                                );
                                ui.painter().rect_filled(
                                    rect,
                                    2.0,
                                    egui::Color32::from_rgb(
                                        object.color.r,
                                        object.color.g,
                                        object.color.b,
                                    ),
                                );
                                ui.monospace(object.color.to_hex());
                            });
                        });
                    }
                });
        });
    }

    /// The scroll-binding stand-in: a plain vertical scroll area whose
    /// offset maps linearly onto the progress fraction. Drags and auto-play
    /// push their value back in through `pending_scroll`; the transport
    /// treats the resulting echo as feedback, not input.
    fn scroll_strip(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("scroll_strip").default_width(150.0).show(ctx, |ui| {
            ui.heading("Scroll");
            ui.small("Scroll to drive the showcase.");
            let mut area = egui::ScrollArea::vertical().id_salt("progress_strip");
            if let Some(fraction) = self.pending_scroll.take() {
                area = area.vertical_scroll_offset(fraction as f32 * self.strip_max);
            }
            let output = area.show(ui, |ui| {
                for i in 0..=20 {
                    ui.add_space(56.0);
                    ui.monospace(format!("- {:>3}%", i * 5));
                }
                ui.add_space(24.0);
            });
            self.strip_max = (output.content_size.y - output.inner_rect.height()).max(1.0);
            let fraction = (output.state.offset.y / self.strip_max).clamp(0.0, 1.0) as f64;
            self.session.set_external_progress(fraction);
        });
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.session.transport.is_playing() {
            ctx.request_repaint_after(std::time::Duration::from_millis(16));
        }
        if let Some(pushed) = self.session.tick() {
            self.pending_scroll = Some(pushed.fraction());
        }

        if ctx.input(|i| i.key_pressed(egui::Key::Space)) {
            self.session.transport.toggle_play();
        }

        for event in self.session.bus.drain() {
            tracing::debug!(?event, "session event");
            if let SessionEvent::SequenceLoaded { .. } = event {
                // snap the scroll source back to the top of the sequence
                self.pending_scroll = Some(0.0);
            }
        }

        self.top_bar(ctx);
        self.scene_panel(ctx);
        self.scroll_strip(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Timeline");
            self.timeline_ui(ui);
        });

        let mut submitted: Vec<EditCommand> = Vec::new();
        if let Some(command) = self.add_property.ui(ctx) {
            submitted.push(command);
        }
        if let Some(command) = self.add_keyframe.ui(ctx) {
            submitted.push(command);
        }
        for command in submitted {
            match self.session.edit(command) {
                Ok(_) => self.status.clear(),
                Err(err) => {
                    tracing::warn!(error = %err, "edit rejected");
                    self.status = err.to_string();
                }
            }
        }
    }
}
