
#[cfg(target_arch = "wasm32")]
use web_sys::console;

#[derive(Clone)]
pub struct Logger {
    /// 10 is everything and 0 is nothing
    level: u8,
}

impl Logger {

    pub fn new(level: u8) -> Self {
        Logger { level }
    }

    pub fn log(&self, level: u8, msg: &str) {
        if level <= self.level {

            #[cfg(not(target_arch = "wasm32"))]
            println!("{}", msg);

            #[cfg(target_arch = "wasm32")]
            console::log_1(&msg.into());

        }
    }

    pub fn log_lazy(&self, level: u8, msg: impl FnOnce() -> String) {
        if level <= self.level {
            self.log(level, &msg());
        }
    }
}
