use techmap_shared::config::FOCUS_ZOOM;
use techmap_shared::{CategoryFilter, DataLoadFailure, DataStore, Entity, EntityId, LatLng, ViewState};

use crate::list::ListModel;
use crate::markers::{Marker, MarkerLayer};

#[derive(Debug, Clone, PartialEq)]
pub enum LoadStatus {
    Pending,
    Loaded,
    Failed(DataLoadFailure),
}

/// Everything the UI can ask the application to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    Loaded(Vec<Entity>),
    LoadFailed(DataLoadFailure),
    SetFilter(CategoryFilter),
    SetQuery(String),
    ToggleSidebar,
    /// A list row was clicked.
    FocusEntity(EntityId),
    /// A map pin was clicked.
    OpenPopup(EntityId),
    ClosePopup,
}

/// Side effects on the map camera, applied by the view layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    CenterOn { position: LatLng, zoom: f64 },
}

/// Single owner of application state. Every message that can change the
/// visible subset re-projects and redraws markers and list together, so the
/// two always show the same set.
#[derive(Debug)]
pub struct AppState {
    store: DataStore,
    view: ViewState,
    preselected: Option<EntityId>,
    sidebar_hidden: bool,
    load: LoadStatus,
    visible: Vec<Entity>,
    markers: MarkerLayer,
    list: ListModel,
}

impl AppState {
    pub fn new(preselected: Option<EntityId>) -> Self {
        let mut state = Self {
            store: DataStore::new(),
            view: ViewState::default(),
            preselected,
            sidebar_hidden: false,
            load: LoadStatus::Pending,
            visible: Vec::new(),
            markers: MarkerLayer::default(),
            list: ListModel::default(),
        };
        state.rerender();
        state
    }

    pub fn dispatch(&mut self, msg: Msg) -> Vec<Command> {
        match msg {
            Msg::Loaded(entities) => {
                self.store.load(entities);
                self.load = LoadStatus::Loaded;
                self.rerender();
                self.take_preselection().into_iter().collect()
            }
            Msg::LoadFailed(failure) => {
                self.store.load(Vec::new());
                self.load = LoadStatus::Failed(failure);
                self.rerender();
                Vec::new()
            }
            Msg::SetFilter(filter) => {
                self.view.filter = filter;
                self.rerender();
                Vec::new()
            }
            Msg::SetQuery(query) => {
                self.view.query = query;
                self.rerender();
                Vec::new()
            }
            Msg::ToggleSidebar => {
                self.sidebar_hidden = !self.sidebar_hidden;
                Vec::new()
            }
            Msg::FocusEntity(id) => self.focus(id).into_iter().collect(),
            Msg::OpenPopup(id) => {
                if self.markers.get(id).is_some() {
                    self.view.focused = Some(id);
                }
                Vec::new()
            }
            Msg::ClosePopup => {
                self.view.focused = None;
                Vec::new()
            }
        }
    }

    fn rerender(&mut self) {
        self.visible = self.store.project(&self.view);
        self.markers.render(&self.visible);
        self.list.render(&self.visible);
        if let Some(id) = self.view.focused
            && self.markers.get(id).is_none()
        {
            self.view.focused = None;
        }
    }

    /// Center on a visible entity and open its popup. Entities without
    /// coordinates are ignored.
    fn focus(&mut self, id: EntityId) -> Option<Command> {
        let position = self.markers.get(id)?.position;
        self.view.focused = Some(id);
        Some(Command::CenterOn {
            position,
            zoom: FOCUS_ZOOM,
        })
    }

    /// The page-requested entity is honored once, right after the first load.
    fn take_preselection(&mut self) -> Option<Command> {
        let id = self.preselected.take()?;
        let position = self.store.get(id)?.position?;
        if self.markers.get(id).is_some() {
            self.view.focused = Some(id);
        }
        Some(Command::CenterOn {
            position,
            zoom: FOCUS_ZOOM,
        })
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn visible(&self) -> &[Entity] {
        &self.visible
    }

    pub fn markers(&self) -> &MarkerLayer {
        &self.markers
    }

    pub fn list(&self) -> &ListModel {
        &self.list
    }

    pub fn sidebar_hidden(&self) -> bool {
        self.sidebar_hidden
    }

    pub fn load_status(&self) -> &LoadStatus {
        &self.load
    }

    /// User-facing error text while the last load attempt has failed.
    pub fn error_message(&self) -> Option<&'static str> {
        match &self.load {
            LoadStatus::Failed(failure) => Some(failure.user_message()),
            _ => None,
        }
    }

    /// Marker whose popup is open, if it is still on the map.
    pub fn popup(&self) -> Option<&Marker> {
        self.view.focused.and_then(|id| self.markers.get(id))
    }
}
