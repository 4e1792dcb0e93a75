use macroquad::prelude::*;
use tmx_viewport::{EdgePolicy, Map, MacroquadBackend, RenderConfig};
use tracing_subscriber::EnvFilter;

fn window_conf() -> Conf {
    Conf {
        window_title: "TMX Render Example".into(),
        window_width: 1280,
        window_height: 720,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        tracing::error!("pass the path of a Tiled .json map as the first argument");
        return;
    };
    let edge_policy = if args.any(|a| a == "--repeat-edges") {
        EdgePolicy::Repeat
    } else {
        EdgePolicy::Skip
    };

    let map = match Map::load(&path) {
        Ok(map) => map.with_config(RenderConfig { edge_policy }),
        Err(e) => {
            tracing::error!("failed to load {path}: {e}");
            return;
        }
    };

    let mut backend = MacroquadBackend;
    let mut hero = Vec2::ZERO;
    let mut frames = 0u32;
    let mut last_report = get_time();

    loop {
        if is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q) {
            break;
        }

        clear_background(BLACK);

        // Movement with arrow keys
        let dx = is_key_down(KeyCode::Right) as i32 - is_key_down(KeyCode::Left) as i32;
        let dy = is_key_down(KeyCode::Down) as i32 - is_key_down(KeyCode::Up) as i32;
        hero += vec2(dx as f32, dy as f32);

        // Draw the map under the centered hero position
        let origin = vec2(
            (hero.x - screen_width() / 2.0).trunc(),
            (hero.y - screen_height() / 2.0).trunc(),
        );
        map.draw(&mut backend, origin);

        frames += 1;
        let now = get_time();
        if now - last_report > 1.0 {
            last_report = now;
            tracing::info!(frames, "frame rate");
            frames = 0;
        }

        next_frame().await;
    }
}
