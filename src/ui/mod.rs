//! Drawer panels and the top bar.
//!
//! Each named area of the model maps to one drawer panel; opening a panel
//! closes every other one first, so at most a single drawer is open at any
//! time. The close button inside the drawer clears all of them.

/// Drawer panel identifiers, one per clickable area of the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelId {
    Area01,
    Area02,
    Area03,
    CreatedArea,
}

/// Mesh name to drawer panel table. Names not listed here open nothing.
pub const AREA_PANELS: [(&str, PanelId); 4] = [
    ("area01", PanelId::Area01),
    ("area02", PanelId::Area02),
    ("area03", PanelId::Area03),
    ("createdArea", PanelId::CreatedArea),
];

pub fn panel_for_area(name: &str) -> Option<PanelId> {
    AREA_PANELS
        .iter()
        .find(|(area, _)| *area == name)
        .map(|(_, panel)| *panel)
}

impl PanelId {
    pub fn title(&self) -> &'static str {
        match self {
            PanelId::Area01 => "Area 01",
            PanelId::Area02 => "Area 02",
            PanelId::Area03 => "Area 03",
            PanelId::CreatedArea => "Created Area",
        }
    }

    pub fn body(&self) -> &'static str {
        match self {
            PanelId::Area01 => "Reception and entrance hall.",
            PanelId::Area02 => "Open workspace with hot desks.",
            PanelId::Area03 => "Meeting rooms and phone booths.",
            PanelId::CreatedArea => "Custom area added to the floor plan.",
        }
    }
}

/// Flags the UI raises for the app to act on after the frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct UiActions {
    pub open_model: bool,
}

pub struct UiState {
    open_panel: Option<PanelId>,
    model_name: String,
    status: String,
}

impl UiState {
    pub fn new() -> Self {
        Self {
            open_panel: None,
            model_name: String::new(),
            status: String::new(),
        }
    }

    pub fn open_panel(&self) -> Option<PanelId> {
        self.open_panel
    }

    /// Close every drawer, then open the one matching `panel`.
    pub fn show_drawer(&mut self, panel: PanelId) {
        self.close_all();
        self.open_panel = Some(panel);
    }

    pub fn close_all(&mut self) {
        self.open_panel = None;
    }

    pub fn set_model_name(&mut self, name: &str) {
        self.model_name = name.to_string();
    }

    pub fn set_status(&mut self, status: String) {
        self.status = status;
    }

    /// Draw the top bar and the drawer for the current frame.
    pub fn draw(&mut self, ctx: &egui::Context) -> UiActions {
        let mut actions = UiActions::default();

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Open model…").clicked() {
                    actions.open_model = true;
                }
                if self.model_name.is_empty() {
                    ui.label("No model loaded");
                } else {
                    ui.label(&self.model_name);
                }
                if !self.status.is_empty() {
                    ui.separator();
                    ui.label(&self.status);
                }
            });
        });

        let mut close_requested = false;
        if let Some(panel) = self.open_panel {
            egui::SidePanel::right("drawer")
                .resizable(false)
                .exact_width(300.0)
                .show(ctx, |ui| {
                    ui.heading(panel.title());
                    ui.separator();
                    ui.label(panel.body());
                    ui.add_space(12.0);
                    if ui.button("Close").clicked() {
                        close_requested = true;
                    }
                });
        }
        if close_requested {
            self.close_all();
        }

        actions
    }
}

#[cfg(test)]
mod tests {
    use super::{panel_for_area, PanelId, UiState, AREA_PANELS};

    #[test]
    fn mapping_covers_all_four_areas() {
        assert_eq!(AREA_PANELS.len(), 4);
        assert_eq!(panel_for_area("area01"), Some(PanelId::Area01));
        assert_eq!(panel_for_area("area02"), Some(PanelId::Area02));
        assert_eq!(panel_for_area("area03"), Some(PanelId::Area03));
        assert_eq!(panel_for_area("createdArea"), Some(PanelId::CreatedArea));
    }

    #[test]
    fn unknown_names_have_no_panel() {
        assert_eq!(panel_for_area("roof"), None);
        assert_eq!(panel_for_area(""), None);
        assert_eq!(panel_for_area("Area01"), None);
    }

    #[test]
    fn opening_a_second_drawer_closes_the_first() {
        let mut ui = UiState::new();
        ui.show_drawer(PanelId::Area01);
        assert_eq!(ui.open_panel(), Some(PanelId::Area01));
        ui.show_drawer(PanelId::Area03);
        assert_eq!(ui.open_panel(), Some(PanelId::Area03));
    }

    #[test]
    fn close_all_leaves_no_drawer_open() {
        let mut ui = UiState::new();
        ui.show_drawer(PanelId::CreatedArea);
        ui.close_all();
        assert_eq!(ui.open_panel(), None);
    }
}
