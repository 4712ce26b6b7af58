mod demo;

lib_app::app_main!(demo::Demo);
