use network_grapher::grapher::{
	BackendKind, Grapher, GrapherConfig, GrapherError, Link, ManualScheduler, Node,
	RendererBackend, Result, Scale, Scene, Viewport,
};

/// One `render` call as seen by the backend.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
	pub nodes: Vec<Node>,
	pub links: Vec<Link>,
	pub viewport: Viewport,
}

/// Backend that keeps a copy of everything it was asked to draw.
#[derive(Debug, Default)]
pub struct Recorder {
	pub viewport: Viewport,
	pub frames: Vec<Frame>,
	pub lost: bool,
	pub restores: usize,
	pub fail_restore: bool,
	pub size: (f64, f64),
}

impl Recorder {
	pub fn last(&self) -> &Frame {
		self.frames.last().expect("nothing rendered")
	}
}

impl RendererBackend for Recorder {
	fn kind(&self) -> BackendKind {
		BackendKind::WebGl
	}

	fn set_scale(&mut self, scale: Scale) {
		self.viewport.transform.scale = scale;
	}

	fn set_translate(&mut self, translate: [f64; 2]) {
		self.viewport.transform.translate = translate;
	}

	fn viewport(&self) -> Viewport {
		self.viewport
	}

	fn resize(&mut self, width: Option<f64>, height: Option<f64>) {
		self.size = (width.unwrap_or(self.size.0), height.unwrap_or(self.size.1));
	}

	fn size(&self) -> (f64, f64) {
		self.size
	}

	fn render(&mut self, scene: Scene<'_>) {
		assert!(!self.lost, "drew while the context was lost");
		self.frames.push(Frame {
			nodes: scene.nodes.to_vec(),
			links: scene.links.to_vec(),
			viewport: self.viewport,
		});
	}

	fn context_lost(&mut self) {
		self.lost = true;
	}

	fn context_restored(&mut self) -> Result<()> {
		if self.fail_restore {
			return Err(GrapherError::ContextUnavailable("webgl"));
		}
		self.lost = false;
		self.restores += 1;
		Ok(())
	}
}

pub type TestGrapher = Grapher<Recorder, ManualScheduler>;

pub fn grapher() -> TestGrapher {
	Grapher::new(Recorder::default(), ManualScheduler::new(), &GrapherConfig::default())
}

/// Fire the outstanding frame, if any, the way the browser would.
pub fn tick(grapher: &mut TestGrapher) -> bool {
	if grapher.scheduler_mut().fire().is_none() {
		return false;
	}
	grapher.animate();
	true
}
