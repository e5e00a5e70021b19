mod interaction;
mod view;
