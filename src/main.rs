fn main() {
    if let Err(err) = graph_canvas_renderer::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
