//! GLSL sources for the WebGL backend.
//!
//! Colors arrive as four 0-255 floats and are normalized in the vertex stage.
//! Positions are device pixels with the origin at the top left.

/// A vertex/fragment pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShaderSources {
	/// Vertex stage.
	pub vertex: String,
	/// Fragment stage.
	pub fragment: String,
}

impl ShaderSources {
	/// Default link program: flat colored lines.
	pub fn links() -> Self {
		Self {
			vertex: LINK_VERTEX.to_owned(),
			fragment: LINK_FRAGMENT.to_owned(),
		}
	}

	/// Default node program: circles cut out of covering triangles.
	pub fn nodes() -> Self {
		Self {
			vertex: NODE_VERTEX.to_owned(),
			fragment: NODE_FRAGMENT.to_owned(),
		}
	}
}

const LINK_VERTEX: &str = "
uniform vec2 u_resolution;
attribute vec2 a_position;
attribute vec4 a_rgba;
varying vec4 rgba;
void main() {
  vec2 clipspace = a_position / u_resolution * 2.0 - 1.0;
  gl_Position = vec4(clipspace * vec2(1, -1), 0, 1);
  rgba = a_rgba / 255.0;
}
";

const LINK_FRAGMENT: &str = "
precision mediump float;
varying vec4 rgba;
void main() {
  gl_FragColor = rgba;
}
";

const NODE_VERTEX: &str = "
uniform vec2 u_resolution;
attribute vec2 a_position;
attribute vec4 a_rgba;
attribute vec2 a_center;
attribute float a_radius;
varying vec4 rgba;
varying vec2 center;
varying vec2 resolution;
varying float radius;
void main() {
  vec2 clipspace = a_position / u_resolution * 2.0 - 1.0;
  gl_Position = vec4(clipspace * vec2(1, -1), 0, 1);
  rgba = a_rgba / 255.0;
  radius = a_radius;
  center = a_center;
  resolution = u_resolution;
}
";

// 1px soft edge just outside the radius
const NODE_FRAGMENT: &str = "
precision mediump float;
varying vec4 rgba;
varying vec2 center;
varying vec2 resolution;
varying float radius;
void main() {
  float x = gl_FragCoord.x;
  float y = resolution[1] - gl_FragCoord.y;
  float dx = center[0] - x;
  float dy = center[1] - y;
  float diff = sqrt(dx * dx + dy * dy) - radius;
  if (diff < 0.0)
    gl_FragColor = rgba;
  else if (diff <= 1.0)
    gl_FragColor = vec4(rgba.rgb, rgba.a - diff);
  else
    gl_FragColor = vec4(0.0, 0.0, 0.0, 0.0);
}
";

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn attribute_names_match_vertex_layout() {
		let nodes = ShaderSources::nodes();
		for name in ["a_position", "a_rgba", "a_center", "a_radius", "u_resolution"] {
			assert!(nodes.vertex.contains(name), "node shader lacks {name}");
		}
		let links = ShaderSources::links();
		for name in ["a_position", "a_rgba", "u_resolution"] {
			assert!(links.vertex.contains(name), "link shader lacks {name}");
		}
	}
}
