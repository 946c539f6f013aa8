mod location;
mod timer;

pub use self::location::{
    Location, LocationError, LocationOperation, LocationOutput, LocationResult, PermissionState,
};
pub use self::timer::{Timer, TimerOperation, TimerOutput};

pub use crux_core::render::Render;
pub use crux_http::Http;

use crate::event::Event;
use crate::App;

pub type AppHttp = Http<Event>;
pub type AppRender = Render<Event>;
pub type AppLocation = Location<Event>;
pub type AppTimer = Timer<Event>;

#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub http: Http<Event>,
    pub render: Render<Event>,
    pub location: Location<Event>,
    pub timer: Timer<Event>,
}
