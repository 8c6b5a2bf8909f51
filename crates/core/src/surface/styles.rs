//! Stylesheet and icon markup injected alongside the surface.

pub const CLOSE_ICON_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24" viewBox="0 0 100 100"><line x1="10" y1="10" x2="90" y2="90" stroke="white" stroke-width="10" /><line x1="10" y1="90" x2="90" y2="10" stroke="white" stroke-width="10" /></svg>"#;

pub const SURFACE_CSS: &str = r#":root {
  --ff-primary-color: #4c48ef;
  --ff-secondary-color: #616a7d;
  --ff-text-color: #090b2b;
  --ff-dialog-border-radius: 4px;
  --ff-border-radius: 5px;
  --ff-bg-fade: rgba(0, 0, 0, 0.2);
}
.flatfile_iframe-wrapper {
  display: none;
  min-width: 768px;
  min-height: 600px;
  width: 992px;
  height: 600px;
}
.flatfile_iframe-wrapper.flatfile_displayAsModal {
  box-sizing: content-box;
  position: fixed;
  top: 0;
  left: 0;
  width: calc(100% - 60px);
  max-width: 100vw;
  height: calc(100vh - 60px);
  padding: 30px;
  background: var(--ff-bg-fade);
  z-index: 1000;
}
.flatfile_displayAsModal .flatfile-close-button {
  position: absolute;
  z-index: 10;
  top: 20px;
  right: 5px;
  display: flex;
  justify-content: center;
  align-items: center;
  width: 25px;
  height: 25px;
  border-radius: 100%;
  border: none;
  cursor: pointer;
  background: #000;
  box-shadow: 0px 0px 10px 0px rgba(0, 0, 0, 0.5);
}
.flatfile_displayAsModal .flatfile-close-button svg {
  fill: var(--ff-secondary-color);
  width: 10px;
}
#flatfile_iframe {
  border-width: 0px;
  width: 100%;
  height: 100%;
  position: relative;
}
.flatfile_displayAsModal #flatfile_iframe {
  border-radius: var(--ff-border-radius);
  background: rgb(255, 255, 255);
}
.flatfile_outer-shell {
  background-color: var(--ff-bg-fade);
  border-radius: var(--ff-border-radius);
  top: 0;
  left: 0;
  width: calc(100% - 40px);
  height: calc(100vh - 40px);
  padding: 20px;
  overflow-y: auto;
  position: fixed;
  z-index: 1200;
}
.flatfile_inner-shell {
  align-items: center;
  box-sizing: border-box;
  display: flex;
  justify-content: center;
  min-height: 100%;
}
.flatfile_modal {
  box-sizing: border-box;
  padding: 1.5em;
  background: #fff;
  min-width: 500px;
  max-width: 500px;
  border-radius: var(--ff-dialog-border-radius);
}
.flatfile_button-group {
  display: flex;
  justify-content: flex-end;
}
.flatfile_button {
  border: 0;
  border-radius: 1px;
  margin-left: 15px;
  padding: 8px 12px;
  cursor: pointer;
}
.flatfile_primary {
  border: 1px solid var(--ff-primary-color);
  background-color: var(--ff-primary-color);
  color: #fff;
}
.flatfile_secondary {
  color: var(--ff-secondary-color);
}
.flatfile_modal-heading {
  font-size: 1.225em;
  font-weight: 600;
  margin-bottom: 0.4em;
  color: var(--ff-text-color);
}
.flatfile_modal-text {
  font-size: 14px;
  line-height: 1.25em;
  margin-bottom: 2em;
  color: var(--ff-secondary-color);
}
.spinner {
  border: 4px solid rgba(255, 255, 255, 0.7);
  border-top: 4px solid var(--ff-primary-color);
  border-radius: 50%;
  width: 50px;
  height: 50px;
  animation: spin 1s linear infinite;
  position: absolute;
  top: 50%;
  left: 50%;
  transform: translate(-50%, -50%);
  z-index: 999;
}
@keyframes spin {
  from { transform: rotate(0deg); }
  to { transform: rotate(360deg); }
}
"#;
